use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Metadata {
    pub name: Option<String>,
    pub description: Option<String>,
}

///Which demo routine to run against the chip.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demo {
    ///Ramp the off fraction from 0 to 4095, then walk the rising edge across
    ///the period with the output held until the end.
    Sweep {
        first_channel: u8,
        channel_count: u16,
    },
    ///Hold each pulse length for a second in turn. With a 50 Hz frequency and
    ///pulses between 500 and 2500 microseconds this steps an SG90-style servo
    ///through its positions.
    Servo {
        first_channel: u8,
        channel_count: u16,
        pulses_us: Vec<u16>,
    },
}

#[derive(Debug, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default = "default_i2c_bus")]
    pub i2c_bus: u8,
    #[serde(default = "default_i2c_address")]
    pub i2c_address: u16,
    pub frequency: u16,
    pub demo: Demo,
}

fn default_i2c_bus() -> u8 {
    1
}

fn default_i2c_address() -> u16 {
    pca9685_rpi_i2c::DEFAULT_ADDRESS
}

#[cfg(test)]
mod tests {
    use super::{Demo, DemoConfig};
    use config_rs::{Config, File, FileFormat};

    #[test]
    fn servo_config_parses_with_defaults() {
        let yaml = "
metadata:
  name: servo demo
frequency: 50
demo:
  servo:
    first_channel: 14
    channel_count: 2
    pulses_us: [500, 1500, 2500]
";
        let config: DemoConfig = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.i2c_bus, 1);
        assert_eq!(config.i2c_address, 0x40);
        assert_eq!(config.frequency, 50);
        match config.demo {
            Demo::Servo {
                first_channel: 14,
                channel_count: 2,
                ref pulses_us,
            } => assert_eq!(pulses_us, &[500, 1500, 2500]),
            ref other => panic!("expected servo demo, got {:?}", other),
        }
    }
}
