use super::*;

#[test]
fn test_log_config_default() {
    let config = LogConfig::default();
    assert_eq!(config.log_level, Level::INFO);
    assert!(!config.json_format);
    assert!(config.log_dir.ends_with("logs"));
}

#[test]
fn test_log_config_default_log_dir_under_tagspace_home() {
    let config = LogConfig::default();
    let path_str = config.log_dir.to_string_lossy();
    assert!(path_str.contains(".tagspace"));
}

#[test]
fn test_parse_rotation_hourly() {
    // Rotation doesn't impl PartialEq, so compare debug output
    let debug = format!("{:?}", parse_rotation("hourly"));
    assert_eq!(debug, format!("{:?}", Rotation::HOURLY));
}

#[test]
fn test_parse_rotation_never() {
    let debug = format!("{:?}", parse_rotation("never"));
    assert_eq!(debug, format!("{:?}", Rotation::NEVER));
}

#[test]
fn test_parse_rotation_case_insensitive() {
    let hourly = format!("{:?}", parse_rotation("HOURLY"));
    assert_eq!(hourly, format!("{:?}", Rotation::HOURLY));
    let never = format!("{:?}", parse_rotation("Never"));
    assert_eq!(never, format!("{:?}", Rotation::NEVER));
}

#[test]
fn test_parse_rotation_unknown_defaults_to_daily() {
    let debug = format!("{:?}", parse_rotation("weekly"));
    assert_eq!(debug, format!("{:?}", Rotation::DAILY));
}

#[test]
fn test_log_filename_constant() {
    assert_eq!(LOG_FILENAME, "tagspace.log");
}

#[test]
fn test_log_file_path_is_set_once() {
    let first = set_log_file_path("/tmp/tagspace-test.log".to_owned());
    let second = set_log_file_path("/tmp/other.log".to_owned());
    assert!(!(first && second));
    assert!(!get_log_file_path().is_empty());
}
