//! Bus frame codec
//!
//! A bus frame looks like `IP2VFSTATS ID_:7;NAM:cam7;FPS:29.7`: a message-kind
//! keyword, whitespace, then `;`-separated fields. Each field is a 3-character
//! key code, one delimiter character (modules use `:` or `=`) and the value.
//!
//! The registry's HTTP boundary uses the same key codes as path segments:
//! `/modulestats/ID_/7/NAM/cam7/FPS/29.7`.

use std::fmt;

use crate::error::{Result, SupervisorError};
use crate::registry::ModuleId;

/// Topic prefix every module publishes under
pub const TOPIC_PREFIX: &str = "IP2VF";

const FIELD_SEPARATOR: char = ';';
const KEY_LEN: usize = 3;
/// Key code plus one delimiter character
const VALUE_OFFSET: usize = KEY_LEN + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Stats,
}

impl MessageKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "IP2VFINFOS" => Some(MessageKind::Info),
            "IP2VFSTATS" => Some(MessageKind::Stats),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            MessageKind::Info => "IP2VFINFOS",
            MessageKind::Stats => "IP2VFSTATS",
        }
    }

    /// First path segment of the matching ingestion endpoint
    pub fn endpoint(self) -> &'static str {
        match self {
            MessageKind::Info => "moduleinfos",
            MessageKind::Stats => "modulestats",
        }
    }
}

/// Field identifiers shared by the bus protocol and the HTTP path encoding
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldCode {
    Id,
    Name,
    ControlPort,
    StartTime,
    PinIndex,
    PinType,
    PinDirection,
    PinFrameSize,
    Fps,
    FrameCount,
    CpuUser,
    CpuKernel,
    Memory,
    /// Added by the relay: address the module was observed at
    Ip,
    /// Added by the relay: encoded thumbnail reference
    Thumb,
    /// Anything else; forwarded untouched
    Other(String),
}

impl FieldCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "ID_" => FieldCode::Id,
            "NAM" => FieldCode::Name,
            "MTN" => FieldCode::ControlPort,
            "STA" => FieldCode::StartTime,
            "PID" => FieldCode::PinIndex,
            "PTY" => FieldCode::PinType,
            "PDI" => FieldCode::PinDirection,
            "PFS" => FieldCode::PinFrameSize,
            "FPS" => FieldCode::Fps,
            "FRM" => FieldCode::FrameCount,
            "USE" => FieldCode::CpuUser,
            "KER" => FieldCode::CpuKernel,
            "MEM" => FieldCode::Memory,
            "IP" => FieldCode::Ip,
            "THUMB" => FieldCode::Thumb,
            other => FieldCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldCode::Id => "ID_",
            FieldCode::Name => "NAM",
            FieldCode::ControlPort => "MTN",
            FieldCode::StartTime => "STA",
            FieldCode::PinIndex => "PID",
            FieldCode::PinType => "PTY",
            FieldCode::PinDirection => "PDI",
            FieldCode::PinFrameSize => "PFS",
            FieldCode::Fps => "FPS",
            FieldCode::FrameCount => "FRM",
            FieldCode::CpuUser => "USE",
            FieldCode::CpuKernel => "KER",
            FieldCode::Memory => "MEM",
            FieldCode::Ip => "IP",
            FieldCode::Thumb => "THUMB",
            FieldCode::Other(code) => code,
        }
    }

    /// Fields computed by the relay rather than announced by the module
    pub fn is_relay_computed(&self) -> bool {
        matches!(self, FieldCode::Ip | FieldCode::Thumb)
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub code: FieldCode,
    pub value: String,
}

impl Field {
    pub fn new(code: FieldCode, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }
}

/// One decoded bus frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub kind: MessageKind,
    pub module_id: ModuleId,
    /// Fields in the order they were received, `ID_` included
    pub fields: Vec<Field>,
}

impl Frame {
    /// Decode a raw bus frame
    ///
    /// Fails with `MalformedFrame` on an unknown kind keyword, a field too
    /// short to hold a key and delimiter, or a missing/non-integer `ID_`.
    pub fn decode(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (keyword, content) = match raw.split_once(char::is_whitespace) {
            Some((keyword, content)) => (keyword, content.trim_start()),
            None => (raw, ""),
        };

        let kind = MessageKind::from_keyword(keyword).ok_or_else(|| {
            SupervisorError::MalformedFrame(format!("unrecognized message kind '{}'", keyword))
        })?;

        let fields = parse_content(content)?;
        let module_id = find_module_id(&fields)?;

        Ok(Self {
            kind,
            module_id,
            fields,
        })
    }

    pub fn push(&mut self, code: FieldCode, value: impl Into<String>) {
        self.fields.push(Field::new(code, value));
    }

    pub fn value_of(&self, code: &FieldCode) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| &f.code == code)
            .map(|f| f.value.as_str())
    }

    /// Path segments of the ingestion request: endpoint, then code/value pairs
    pub fn path_segments(&self) -> Vec<&str> {
        let mut segments = Vec::with_capacity(1 + self.fields.len() * 2);
        segments.push(self.kind.endpoint());
        for field in &self.fields {
            segments.push(field.code.as_str());
            segments.push(field.value.as_str());
        }
        segments
    }

    /// Ingestion request path, e.g. `/modulestats/ID_/7/FPS/25`
    ///
    /// Every segment is percent-encoded, so a `/` inside a value stays in
    /// its segment.
    pub fn to_path(&self) -> String {
        let mut path = String::new();
        for segment in self.path_segments() {
            path.push('/');
            path.push_str(&urlencoding::encode(segment));
        }
        path
    }

    /// Encode back to bus text, using `:` as the delimiter
    pub fn encode(&self) -> String {
        let content: Vec<String> = self
            .fields
            .iter()
            .filter(|f| !f.code.is_relay_computed())
            .map(|f| format!("{}:{}", f.code, f.value))
            .collect();
        format!("{} {}", self.kind.keyword(), content.join(";"))
    }
}

fn parse_content(content: &str) -> Result<Vec<Field>> {
    content
        .split(FIELD_SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(parse_field)
        .collect()
}

fn parse_field(token: &str) -> Result<Field> {
    let (Some(code), Some(value)) = (token.get(..KEY_LEN), token.get(VALUE_OFFSET..)) else {
        return Err(SupervisorError::MalformedFrame(format!(
            "field '{}' has no key/value split",
            token
        )));
    };
    Ok(Field::new(FieldCode::parse(code), value))
}

fn find_module_id(fields: &[Field]) -> Result<ModuleId> {
    let value = fields
        .iter()
        .find(|f| f.code == FieldCode::Id)
        .map(|f| f.value.trim())
        .ok_or_else(|| SupervisorError::MalformedFrame("missing ID_ field".to_string()))?;

    value
        .parse()
        .map_err(|_| SupervisorError::MalformedFrame(format!("invalid module id '{}'", value)))
}

/// Split a raw ingestion path (the part after the endpoint) into fields
///
/// `ID_/7/NAM/cam%2F7` yields `[ID_=7, NAM=cam/7]`. The path must still be
/// percent-encoded: it is split on `/` first and each segment decoded after.
/// An odd number of segments is an error since every code must carry a value.
pub fn parse_path_fields(path: &str) -> Result<Vec<Field>> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Ok(Vec::new());
    }

    let segments = path
        .split('/')
        .map(decode_segment)
        .collect::<Result<Vec<_>>>()?;
    if segments.len() % 2 != 0 {
        return Err(SupervisorError::InvalidInput(format!(
            "path '{}' does not consist of code/value pairs",
            path
        )));
    }

    Ok(segments
        .chunks_exact(2)
        .map(|pair| Field::new(FieldCode::parse(&pair[0]), pair[1].as_str()))
        .collect())
}

fn decode_segment(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| {
            SupervisorError::InvalidInput(format!("segment '{}' is not valid UTF-8", segment))
        })
}
