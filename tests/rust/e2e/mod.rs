//! End-to-end tests - require a running MLDB server with the python plugin
//!
//! Point `MLDB_URL` at the server and run with `--ignored`.

#[cfg(test)]
mod tests {
    use pylog_check::client::PluginClient;
    use pylog_check::config::ClientConfig;
    use pylog_check::scenario::LogScenario;

    #[tokio::test]
    #[ignore = "requires a running MLDB server (MLDB_URL)"]
    async fn mldb_log_renders_all_value_types() {
        dotenvy::dotenv().ok();
        let config = ClientConfig::from_env().expect("config from environment");
        let client = PluginClient::new(&config).expect("client");

        let report = LogScenario::standard()
            .run(&client)
            .await
            .expect("log rendering check");

        assert_eq!(report.checked, 5);
        assert_eq!(report.result_marker(), "success");
    }
}
