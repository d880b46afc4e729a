mod cli_test;
mod properties_test;
mod scenario_test;
mod timeout_test;
