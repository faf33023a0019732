//! This module contains the macros used in the project.

/// Read a value from the config file, or ask for it and store it
///
/// Must be used in a function returning `Result<_, MoverError>`.
macro_rules! config_value {
    ($config:ident, $setting_name:ident, $struct_name:ident, $key_name:ident, $string:expr, $reader:path) => {
        match $config
            .config_data
            .$setting_name
            .as_ref()
            .and_then(|c| c.$key_name.clone())
        {
            Some(value) => value,
            None => {
                println!(concat!("Please enter ", $string, ":"));
                let value = $reader()?;
                let cloned_value = value.clone();
                $config.update(|config_data| {
                    if let Some(local_config) = config_data.$setting_name.as_mut() {
                        local_config.$key_name = Some(cloned_value);
                    } else {
                        config_data.$setting_name = Some($struct_name {
                            $key_name: Some(cloned_value),
                            ..Default::default()
                        });
                    }
                })?;
                value
            }
        }
    };
}

/// Value taken from the CLI or environment, else from the config file, else asked
macro_rules! config_value_wrap {
    ($config:ident, $cli_name:ident, $setting_name:ident, $struct_name:ident, $key_name:ident, $string:expr) => {
        match $config.cli_args.$cli_name.clone() {
            Some(value) => value,
            None => $crate::macros::config_value!(
                $config,
                $setting_name,
                $struct_name,
                $key_name,
                $string,
                $crate::utils::input
            ),
        }
    };
}

/// Same as [`config_value_wrap`] but the typed value is not echoed
macro_rules! config_password_wrap {
    ($config:ident, $cli_name:ident, $setting_name:ident, $struct_name:ident, $key_name:ident, $string:expr) => {
        match $config.cli_args.$cli_name.clone() {
            Some(value) => value,
            None => $crate::macros::config_value!(
                $config,
                $setting_name,
                $struct_name,
                $key_name,
                $string,
                $crate::utils::get_password
            ),
        }
    };
}

pub(crate) use config_password_wrap;
pub(crate) use config_value;
pub(crate) use config_value_wrap;
