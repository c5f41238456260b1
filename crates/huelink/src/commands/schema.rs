use crate::error::CliError;

pub fn handle() -> Result<(), CliError> {
    let schema = huelink_config::config_schema();
    let text = serde_json::to_string_pretty(&schema).map_err(std::io::Error::other)?;
    println!("{text}");
    Ok(())
}
