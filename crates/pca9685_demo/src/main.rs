pub mod config;

use std::io::{Read, Write};
use std::time::Duration;

use config::{Demo, DemoConfig};
use config_rs::{Config, File};
use pca9685_core::{Pca9685, FRACTION_MAX};
use pca9685_rpi_i2c::I2cTransport;
use tokio::time::sleep;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pca9685_demo=debug,pca9685_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        warn!("only one parameter, the config file, is expected.");
        warn!("got {}", args.join(","));
    } else if let Some(cfg_name) = args.get(1).map(|o| o.as_str()) {
        let config_res = Config::builder()
            .add_source(File::with_name(cfg_name))
            .build()
            .and_then(|config| config.try_deserialize::<DemoConfig>());

        match config_res {
            Ok(config) => {
                if let Some(ref name) = config.metadata.name {
                    info!("name: {name}")
                }
                if let Some(ref descrip) = config.metadata.description {
                    info!("description: {descrip}")
                }
                match run(config).await {
                    Ok(_) => info!("demo finished, all channels off"),
                    Err(err) => error!("demo exited with an error: {:?}", err),
                }
            }
            Err(err) => {
                error!("failed to parse config: {:?}", err);
            }
        }
    }
}

async fn run(config: DemoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let transport = I2cTransport::new(config.i2c_bus, config.i2c_address)?;
    let mut device = Pca9685::new(transport)?;
    device.set_frequency(config.frequency)?;
    info!("chip running at {} Hz", config.frequency);

    let demo_result = run_demo(&mut device, &config.demo).await;

    //leave the outputs off even when the demo itself failed
    let off_result = device.turn_off();
    demo_result?;
    off_result?;
    Ok(())
}

async fn run_demo<B: Read + Write>(
    device: &mut Pca9685<B>,
    demo: &Demo,
) -> Result<(), pca9685_core::Error> {
    match demo {
        Demo::Sweep {
            first_channel,
            channel_count,
        } => {
            info!(
                "sweeping duty cycle on {} channel(s) starting at {}",
                channel_count, first_channel
            );
            let mut group = device.channels(*first_channel, *channel_count);
            for off in 0..=FRACTION_MAX {
                group.set_period(0, off)?;
                sleep(Duration::from_millis(2)).await;
            }
            sleep(Duration::from_secs(1)).await;
            for on in 0..=FRACTION_MAX {
                group.set_period(on, FRACTION_MAX)?;
                sleep(Duration::from_millis(2)).await;
            }
        }
        Demo::Servo {
            first_channel,
            channel_count,
            pulses_us,
        } => {
            let mut group = device.channels(*first_channel, *channel_count);
            for pulse in pulses_us {
                info!("pulse width {} us", pulse);
                group.set_on_duration(*pulse)?;
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
    Ok(())
}
