mod executor_tests;
