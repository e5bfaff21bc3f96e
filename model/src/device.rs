use crate::ModelError;
use candle_core::Device;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where the networks live. Chosen once in configuration and handed to the
/// model constructor. Configured as `cpu`, `cuda:N` or `metal:N`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComputeDevice {
    #[default]
    Cpu,
    Cuda(usize),
    Metal(usize),
}

impl ComputeDevice {
    pub fn to_candle(self) -> Result<Device, ModelError> {
        match self {
            Self::Cpu => Ok(Device::Cpu),
            Self::Cuda(ordinal) => Ok(Device::new_cuda(ordinal)?),
            Self::Metal(ordinal) => Ok(Device::new_metal(ordinal)?),
        }
    }
}

impl FromStr for ComputeDevice {
    type Err = ModelError;

    /// Accepts `cpu`, `cuda`, `cuda:N`, `metal` and `metal:N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ModelError::UnknownDevice(s.to_string());
        let (kind, ordinal) = match s.trim().split_once(':') {
            Some((kind, ordinal)) => (kind, ordinal.parse().map_err(|_| unknown())?),
            None => (s.trim(), 0),
        };
        match kind.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(ordinal)),
            "metal" => Ok(Self::Metal(ordinal)),
            _ => Err(unknown()),
        }
    }
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
            Self::Metal(ordinal) => write!(f, "metal:{ordinal}"),
        }
    }
}

impl TryFrom<String> for ComputeDevice {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ComputeDevice> for String {
    fn from(device: ComputeDevice) -> Self {
        device.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_device_names() {
        assert_eq!("cpu".parse::<ComputeDevice>().unwrap(), ComputeDevice::Cpu);
        assert_eq!("CUDA".parse::<ComputeDevice>().unwrap(), ComputeDevice::Cuda(0));
        assert_eq!("cuda:2".parse::<ComputeDevice>().unwrap(), ComputeDevice::Cuda(2));
        assert_eq!("metal:1".parse::<ComputeDevice>().unwrap(), ComputeDevice::Metal(1));
        assert!("tpu".parse::<ComputeDevice>().is_err());
        assert!("cuda:x".parse::<ComputeDevice>().is_err());
    }

    #[test]
    fn cpu_is_always_available() {
        assert!(ComputeDevice::Cpu.to_candle().unwrap().is_cpu());
    }

    #[test]
    fn deserializes_from_device_strings() {
        let device: ComputeDevice = serde_json::from_str(r#""cuda:1""#).unwrap();
        assert_eq!(device, ComputeDevice::Cuda(1));
        let device: ComputeDevice = serde_json::from_str(r#""cpu""#).unwrap();
        assert_eq!(device, ComputeDevice::Cpu);
        assert!(serde_json::from_str::<ComputeDevice>(r#""tpu""#).is_err());
        assert_eq!(
            serde_json::to_string(&ComputeDevice::Metal(2)).unwrap(),
            r#""metal:2""#
        );
    }
}
