mod external_tests;
mod metrics_tests;
mod pool_tests;
mod protocol_tests;
mod registry_tests;
mod server_tests;
