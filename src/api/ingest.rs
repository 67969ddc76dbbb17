//! Typed decoding of ingestion paths
//!
//! `/moduleinfos/…` and `/modulestats/…` carry their parameters as
//! code/value path segments. Unrecognized codes are ignored so newer modules
//! can announce fields this registry does not know yet.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{Result, SupervisorError};
use crate::registry::{InfoUpdate, ModuleStats, PinDescriptor, StatsUpdate};
use crate::telemetry::codec::{parse_path_fields, FieldCode};
use crate::telemetry::thumbnail::decode_reference;

struct PathFields {
    values: HashMap<FieldCode, String>,
}

impl PathFields {
    fn parse(path: &str) -> Result<Self> {
        let mut values = HashMap::new();
        for field in parse_path_fields(path)? {
            if let FieldCode::Other(code) = &field.code {
                tracing::debug!(code = %code, "Ignoring unrecognized field code");
                continue;
            }
            values.insert(field.code, field.value);
        }
        Ok(Self { values })
    }

    fn text(&self, code: FieldCode) -> Result<String> {
        self.values.get(&code).cloned().ok_or_else(|| {
            SupervisorError::InvalidInput(format!("missing required field {}", code))
        })
    }

    fn optional_text(&self, code: FieldCode) -> Option<String> {
        self.values.get(&code).cloned()
    }

    fn number<T: FromStr>(&self, code: FieldCode) -> Result<T> {
        let raw = self.text(code.clone())?;
        raw.trim().parse().map_err(|_| {
            SupervisorError::InvalidInput(format!("field {} has invalid value '{}'", code, raw))
        })
    }
}

/// Decode the still percent-encoded path segments following `/moduleinfos`
pub fn parse_info(path: &str) -> Result<InfoUpdate> {
    let fields = PathFields::parse(path)?;

    Ok(InfoUpdate {
        id: fields.number(FieldCode::Id)?,
        name: fields.text(FieldCode::Name)?,
        thumbnail_url: fields
            .optional_text(FieldCode::Thumb)
            .map(|encoded| decode_reference(&encoded)),
        control_port: fields.number(FieldCode::ControlPort)?,
        start_time: fields.number(FieldCode::StartTime)?,
        pin_index: fields.number(FieldCode::PinIndex)?,
        pin: PinDescriptor {
            pin_type: fields.text(FieldCode::PinType)?,
            direction: fields.number(FieldCode::PinDirection)?,
            frame_size: fields.number(FieldCode::PinFrameSize)?,
        },
        ip: fields.text(FieldCode::Ip)?,
    })
}

/// Decode the path segments following `/modulestats`
///
/// `NAM` may be present but is not required; stats never rename a module.
pub fn parse_stats(path: &str) -> Result<StatsUpdate> {
    let fields = PathFields::parse(path)?;

    Ok(StatsUpdate {
        id: fields.number(FieldCode::Id)?,
        stats: ModuleStats {
            fps: fields.number(FieldCode::Fps)?,
            frame_count: fields.number(FieldCode::FrameCount)?,
            cpu_user: fields.number(FieldCode::CpuUser)?,
            cpu_kernel: fields.number(FieldCode::CpuKernel)?,
            memory: fields.number(FieldCode::Memory)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO_PATH: &str =
        "ID_/5/NAM/cam5/MTN/6005/STA/1700000000/PID/1/PTY/tcp/PDI/0/PFS/4096/IP/192.168.1.10";

    #[test]
    fn test_parse_info_without_thumb() {
        let update = parse_info(INFO_PATH).unwrap();
        assert_eq!(update.id, 5);
        assert_eq!(update.name, "cam5");
        assert_eq!(update.control_port, 6005);
        assert_eq!(update.start_time, 1_700_000_000);
        assert_eq!(update.pin_index, 1);
        assert_eq!(update.pin.pin_type, "tcp");
        assert_eq!(update.pin.frame_size, 4096);
        assert_eq!(update.ip, "192.168.1.10");
        assert!(update.thumbnail_url.is_none());
    }

    #[test]
    fn test_parse_info_decodes_thumb() {
        let path = format!("{}/THUMB/10.0.0.9-ip2vf3-5_frame.png", INFO_PATH);
        let update = parse_info(&path).unwrap();
        assert_eq!(
            update.thumbnail_url.as_deref(),
            Some("http://10.0.0.9/ip2vf3/5_frame.png")
        );
    }

    #[test]
    fn test_parse_info_keeps_slash_in_values() {
        let path = INFO_PATH
            .replace("NAM/cam5", "NAM/cam%2F5")
            .replace("PTY/tcp", "PTY/rtp%2Fudp");
        let update = parse_info(&path).unwrap();
        assert_eq!(update.name, "cam/5");
        assert_eq!(update.pin.pin_type, "rtp/udp");
        assert_eq!(update.ip, "192.168.1.10");
    }

    #[test]
    fn test_parse_info_ignores_unknown_codes() {
        let path = format!("{}/ZZZ/whatever", INFO_PATH);
        assert!(parse_info(&path).is_ok());
    }

    #[test]
    fn test_parse_info_requires_ip() {
        let path = INFO_PATH.trim_end_matches("/IP/192.168.1.10");
        let err = parse_info(path).unwrap_err();
        assert!(err.to_string().contains("missing required field IP"));
    }

    #[test]
    fn test_parse_stats() {
        let update =
            parse_stats("ID_/7/NAM/cam7/FPS/29.7/FRM/120/USE/10/KER/2/MEM/4096").unwrap();
        assert_eq!(update.id, 7);
        assert_eq!(
            update.stats,
            ModuleStats {
                fps: 29.7,
                frame_count: 120,
                cpu_user: 10,
                cpu_kernel: 2,
                memory: 4096,
            }
        );
    }

    #[test]
    fn test_parse_stats_without_name() {
        assert!(parse_stats("ID_/3/FPS/25.00/FRM/1/USE/0/KER/0/MEM/0").is_ok());
    }

    #[test]
    fn test_parse_stats_rejects_non_numeric() {
        let err = parse_stats("ID_/7/FPS/fast/FRM/1/USE/0/KER/0/MEM/0").unwrap_err();
        assert!(matches!(err, SupervisorError::InvalidInput(_)));
        assert!(err.to_string().contains("FPS"));
    }
}
