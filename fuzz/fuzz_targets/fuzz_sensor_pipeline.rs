//! Fuzz target: `SensorPipeline::process_target` / `process_water`
//!
//! Feeds arbitrary raw sample pairs through both channels and asserts the
//! attribute store never leaves its ranges: the setpoint stays within
//! 50–100 °C and the water temperature is either INVALID or 0–100 °C.
//!
//! cargo fuzz run fuzz_sensor_pipeline

#![no_main]

use kettlebridge::app::attributes::AttributeStore;
use kettlebridge::config::KettleConfig;
use kettlebridge::sensors::temperature::Temperature;
use kettlebridge::sensors::{SensorPipeline, WaterReading};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = KettleConfig::default();
    let mut pipeline = SensorPipeline::new(&config);
    let mut store = AttributeStore::new(false, Temperature::from_centi(config.default_setpoint));

    for chunk in data.chunks_exact(4) {
        let dial = u16::from_le_bytes([chunk[0], chunk[1]]);
        let water = u16::from_le_bytes([chunk[2], chunk[3]]);

        pipeline.process_target(dial, &mut store);
        let setpoint = store.heating_setpoint().centi();
        assert!(Temperature::SETPOINT_RANGE.contains(setpoint));

        let before = store.measured_temperature();
        let reading = pipeline.process_water(water, &mut store);
        let t = store.measured_temperature();
        assert_eq!(t, store.local_temperature());
        if let Some(c) = t.get() {
            assert!(Temperature::MEASURED_RANGE.contains(c));
        }
        if reading == WaterReading::Invalidated {
            assert!(before.is_valid() && !t.is_valid());
        }
    }
});
