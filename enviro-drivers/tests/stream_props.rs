//! Stream-level properties of the PMS5003 acquisition loop

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use embedded_hal_mock::eh1::delay::NoopDelay;
use enviro_core::config::Pms5003Config;
use enviro_core::traits::{FrameSink, RunForever};
use enviro_drivers::particulate::{AcquisitionError, Pms5003};
use enviro_hal::uart::{Error, ErrorKind};
use enviro_hal::{ReadExactError, UartRx};
use enviro_protocol::Reading;
use proptest::prelude::*;

#[derive(Debug, PartialEq)]
struct NoError;

impl Error for NoError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Serial stream over a fixed byte vector; end of stream when drained
struct ByteStream {
    data: Vec<u8>,
    pos: usize,
}

impl UartRx for ByteStream {
    type Error = NoError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, NoError> {
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn discard_buffers(&mut self) -> Result<(), NoError> {
        Ok(())
    }
}

/// Output pin that counts falling edges
#[derive(Default)]
struct CountingPin {
    lows: usize,
}

impl ErrorType for CountingPin {
    type Error = Infallible;
}

impl OutputPin for CountingPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.lows += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[derive(Default)]
struct Collect(Vec<Reading>);

impl FrameSink for Collect {
    fn deliver(&mut self, reading: Reading) {
        self.0.push(reading);
    }
}

/// Run the loop over `data` until it drains; returns readings and resets
fn acquire(data: Vec<u8>) -> (Vec<Reading>, usize) {
    let uart = ByteStream { data, pos: 0 };
    let mut pms = Pms5003::new(
        uart,
        CountingPin::default(),
        CountingPin::default(),
        NoopDelay::new(),
        Pms5003Config::default(),
    )
    .unwrap();

    let mut sink = Collect::default();
    let result = pms.run(&mut sink, &RunForever);
    assert_eq!(
        result,
        Err(AcquisitionError::Uart(ReadExactError::UnexpectedEof { read: 0 }))
    );

    let (_, _, reset, _) = pms.release();
    (sink.0, reset.lows)
}

fn any_reading() -> impl Strategy<Value = Reading> {
    prop::array::uniform12(any::<u16>()).prop_map(|d| {
        Reading {
            pm1_0_std: d[0],
            pm2_5_std: d[1],
            pm10_std: d[2],
            pm1_0_env: d[3],
            pm2_5_env: d[4],
            pm10_env: d[5],
            particles_0_3um: d[6],
            particles_0_5um: d[7],
            particles_1_0um: d[8],
            particles_2_5um: d[9],
            particles_5_0um: d[10],
            particles_10um: d[11],
            ..Reading::default()
        }
        .sealed()
    })
}

/// Reading whose encoded body cannot contain the marker
fn low_reading() -> impl Strategy<Value = Reading> {
    prop::array::uniform12(0u16..=0x41).prop_map(|d| {
        Reading {
            pm1_0_std: d[0],
            pm2_5_std: d[1],
            pm10_std: d[2],
            pm1_0_env: d[3],
            pm2_5_env: d[4],
            pm10_env: d[5],
            particles_0_3um: d[6],
            particles_0_5um: d[7],
            particles_1_0um: d[8],
            particles_2_5um: d[9],
            particles_5_0um: d[10],
            particles_10um: d[11],
            ..Reading::default()
        }
        .sealed()
    })
}

/// Garbage that can never form the marker: no 0x4D bytes at all
fn garbage() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>().prop_filter("no 0x4D", |b| *b != 0x4D), 0..40)
}

proptest! {
    #[test]
    fn every_valid_frame_is_delivered_in_order(
        frames in prop::collection::vec((garbage(), any_reading()), 0..8),
        tail in garbage(),
    ) {
        let mut data = Vec::new();
        for (junk, reading) in &frames {
            data.extend_from_slice(junk);
            data.extend_from_slice(&reading.encode());
        }
        data.extend_from_slice(&tail);

        let (delivered, resets) = acquire(data);

        let expected: Vec<Reading> = frames.iter().map(|(_, r)| *r).collect();
        prop_assert_eq!(delivered, expected);
        prop_assert_eq!(resets, 1);
    }

    #[test]
    fn corrupted_frames_are_dropped_without_reset(
        frames in prop::collection::vec((low_reading(), any::<bool>()), 1..8),
    ) {
        let mut data = Vec::new();
        let mut expected = Vec::new();
        for (reading, corrupt) in &frames {
            let mut sent = *reading;
            if *corrupt {
                sent.checksum ^= 0x8000;
            } else {
                expected.push(*reading);
            }
            data.extend_from_slice(&sent.encode());
        }

        let (delivered, resets) = acquire(data);

        prop_assert_eq!(delivered, expected);
        prop_assert_eq!(resets, 1);
    }
}
