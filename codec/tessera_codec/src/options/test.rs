use crate::{options::DEFAULT_PREALLOCATION_LIMIT, Options};

#[test]
fn deserialize_from_toml() {
    let options: Options = toml::from_str("preallocation-limit = 128").unwrap();

    assert_eq!(options.preallocation_limit(), 128);
    assert_eq!(options.capacity_for(1_000), 128);
    assert_eq!(options.capacity_for(3), 3);
}

#[test]
fn missing_fields_use_defaults() {
    let options: Options = toml::from_str("").unwrap();

    assert_eq!(options, Options::default());
}

#[test]
fn builder_defaults_match_default() {
    let options = Options::builder().build();

    assert_eq!(options, Options::default());
    assert_eq!(options.preallocation_limit(), DEFAULT_PREALLOCATION_LIMIT);
}
