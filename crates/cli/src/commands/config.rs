use pricedrop_core::config::{AppConfig, LoadOptions};

pub fn run() -> String {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let mut lines: Vec<String> = config
                .redacted_entries()
                .into_iter()
                .map(|(key, value)| format!("{key} = {value}"))
                .collect();
            lines.sort();
            lines.join("\n")
        }
        Err(error) => format!("configuration issue: {error}"),
    }
}
