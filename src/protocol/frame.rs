//! Module `frame`
//!
//! STOMP 1.2 frame model and text codec used on the broker WebSocket.
//! A frame is a command line, `name:value` header lines, a blank line,
//! the body and a terminating NUL octet. Bare EOLs between frames are
//! heart-beats and carry no frame.

use crate::error::FrameError;

/// STOMP commands exchanged with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StompCommand {
    // Client frames
    Connect,
    Send,
    Subscribe,
    Unsubscribe,
    Disconnect,
    // Server frames
    Connected,
    Message,
    Receipt,
    Error,
}

impl StompCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            StompCommand::Connect => "CONNECT",
            StompCommand::Send => "SEND",
            StompCommand::Subscribe => "SUBSCRIBE",
            StompCommand::Unsubscribe => "UNSUBSCRIBE",
            StompCommand::Disconnect => "DISCONNECT",
            StompCommand::Connected => "CONNECTED",
            StompCommand::Message => "MESSAGE",
            StompCommand::Receipt => "RECEIPT",
            StompCommand::Error => "ERROR",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        match raw {
            // STOMP is the 1.1+ alias of CONNECT
            "CONNECT" | "STOMP" => Ok(StompCommand::Connect),
            "SEND" => Ok(StompCommand::Send),
            "SUBSCRIBE" => Ok(StompCommand::Subscribe),
            "UNSUBSCRIBE" => Ok(StompCommand::Unsubscribe),
            "DISCONNECT" => Ok(StompCommand::Disconnect),
            "CONNECTED" => Ok(StompCommand::Connected),
            "MESSAGE" => Ok(StompCommand::Message),
            "RECEIPT" => Ok(StompCommand::Receipt),
            "ERROR" => Ok(StompCommand::Error),
            other => Err(FrameError::UnknownCommand(other.to_string())),
        }
    }

    /// CONNECT and CONNECTED headers are never escaped.
    fn escapes_headers(&self) -> bool {
        !matches!(self, StompCommand::Connect | StompCommand::Connected)
    }
}

/// A single STOMP frame.
///
/// Headers keep their wire order; repeated names are allowed and the first
/// occurrence is the one that counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub command: StompCommand,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: StompCommand) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Appends a header, builder style.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the value of the first header named `name`.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Serializes the frame, NUL terminator included.
    ///
    /// A `content-length` header is added to frames with a body unless one
    /// is already present.
    pub fn encode(&self) -> String {
        let escape_headers = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());

        out.push_str(self.command.as_str());
        out.push('\n');

        for (name, value) in &self.headers {
            if escape_headers {
                out.push_str(&escape(name));
                out.push(':');
                out.push_str(&escape(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }

        if !self.body.is_empty() && self.get_header("content-length").is_none() {
            out.push_str(&format!("content-length:{}\n", self.body.len()));
        }

        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }
}

/// Parses every frame contained in one WebSocket text message.
///
/// Heart-beat EOLs before, between and after frames are skipped. A message
/// holding only heart-beats yields an empty list.
pub fn parse_frames(input: &str) -> Result<Vec<Frame>, FrameError> {
    let mut frames = Vec::new();
    let mut rest = skip_heartbeats(input);

    while !rest.is_empty() {
        let (frame, remaining) = parse_one(rest)?;
        frames.push(frame);
        rest = skip_heartbeats(remaining);
    }

    Ok(frames)
}

/// Parses exactly the first frame in `input`.
pub fn parse_frame(input: &str) -> Result<Frame, FrameError> {
    let rest = skip_heartbeats(input);
    if rest.is_empty() {
        return Err(FrameError::Empty);
    }
    parse_one(rest).map(|(frame, _)| frame)
}

fn skip_heartbeats(input: &str) -> &str {
    input.trim_start_matches(['\r', '\n'])
}

fn parse_one(input: &str) -> Result<(Frame, &str), FrameError> {
    let (command_line, mut rest) = split_line(input).ok_or(FrameError::MissingTerminator)?;
    let command = StompCommand::parse(command_line)?;
    let unescape_headers = command.escapes_headers();

    let mut headers = Vec::new();
    loop {
        let (line, remaining) = split_line(rest).ok_or(FrameError::MissingTerminator)?;
        rest = remaining;
        if line.is_empty() {
            break;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| FrameError::MalformedHeader(line.to_string()))?;

        if unescape_headers {
            headers.push((unescape(name)?, unescape(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .map(|(_, value)| {
            value
                .trim()
                .parse::<usize>()
                .map_err(|_| FrameError::InvalidContentLength(value.clone()))
        })
        .transpose()?;

    let (body, remaining) = match content_length {
        Some(len) => {
            let body = rest
                .get(..len)
                .ok_or_else(|| FrameError::InvalidContentLength(len.to_string()))?;
            if rest.as_bytes().get(len) != Some(&0) {
                return Err(FrameError::MissingTerminator);
            }
            (body, &rest[len + 1..])
        }
        None => {
            let end = rest.find('\0').ok_or(FrameError::MissingTerminator)?;
            (&rest[..end], &rest[end + 1..])
        }
    };

    let frame = Frame {
        command,
        headers,
        body: body.to_string(),
    };
    Ok((frame, remaining))
}

/// Splits off one line, accepting both LF and CRLF endings.
fn split_line(input: &str) -> Option<(&str, &str)> {
    let end = input.find('\n')?;
    let line = input[..end].strip_suffix('\r').unwrap_or(&input[..end]);
    Some((line, &input[end + 1..]))
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(raw: &str) -> Result<String, FrameError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('c') => out.push(':'),
            _ => return Err(FrameError::InvalidEscape(raw.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_send_adds_content_length() {
        let frame = Frame::new(StompCommand::Send)
            .header("destination", "/rooms/lobby/choice")
            .with_body("{\"a\":1}");

        assert_eq!(
            frame.encode(),
            "SEND\ndestination:/rooms/lobby/choice\ncontent-length:7\n\n{\"a\":1}\0"
        );
    }

    #[test]
    fn test_encode_escapes_header_values() {
        let frame = Frame::new(StompCommand::Subscribe)
            .header("id", "sub-0")
            .header("destination", "/topic/a:b");

        assert_eq!(
            frame.encode(),
            "SUBSCRIBE\nid:sub-0\ndestination:/topic/a\\cb\n\n\0"
        );
    }

    #[test]
    fn test_connect_headers_are_not_escaped() {
        let frame = Frame::new(StompCommand::Connect).header("host", "localhost:8080");
        assert_eq!(frame.encode(), "CONNECT\nhost:localhost:8080\n\n\0");
    }

    #[test]
    fn test_parse_connected() {
        let frame = parse_frame("CONNECTED\nversion:1.2\nheart-beat:0,0\n\n\0").unwrap();
        assert_eq!(frame.command, StompCommand::Connected);
        assert_eq!(frame.get_header("version"), Some("1.2"));
        assert_eq!(frame.get_header("heart-beat"), Some("0,0"));
        assert!(frame.body.is_empty());
    }

    #[test]
    fn test_parse_message_with_crlf_and_unescaping() {
        let raw = "MESSAGE\r\ndestination:/topic/a\\cb\r\nsubscription:sub-1\r\n\r\nDraw!\0";
        let frame = parse_frame(raw).unwrap();
        assert_eq!(frame.command, StompCommand::Message);
        assert_eq!(frame.get_header("destination"), Some("/topic/a:b"));
        assert_eq!(frame.body, "Draw!");
    }

    #[test]
    fn test_parse_body_with_content_length_may_contain_nul() {
        let raw = "MESSAGE\nsubscription:sub-0\ncontent-length:3\n\na\0b\0";
        let frame = parse_frame(raw).unwrap();
        assert_eq!(frame.body, "a\0b");
    }

    #[test]
    fn test_parse_multiple_frames_and_heartbeats() {
        let raw = "\nMESSAGE\nsubscription:sub-0\n\nfirst\0\n\nRECEIPT\nreceipt-id:7\n\n\0\n";
        let frames = parse_frames(raw).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].body, "first");
        assert_eq!(frames[1].command, StompCommand::Receipt);
        assert_eq!(frames[1].get_header("receipt-id"), Some("7"));
    }

    #[test]
    fn test_heartbeat_only_message_has_no_frames() {
        assert!(parse_frames("\n").unwrap().is_empty());
        assert_eq!(parse_frame("\r\n"), Err(FrameError::Empty));
    }

    #[test]
    fn test_first_repeated_header_wins() {
        let frame = parse_frame("MESSAGE\nfoo:first\nfoo:second\n\n\0").unwrap();
        assert_eq!(frame.get_header("foo"), Some("first"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_frame("BOGUS\n\n\0"),
            Err(FrameError::UnknownCommand("BOGUS".into()))
        );
        assert_eq!(
            parse_frame("MESSAGE\nno-colon\n\n\0"),
            Err(FrameError::MalformedHeader("no-colon".into()))
        );
        assert_eq!(
            parse_frame("MESSAGE\nbad:\\t\n\n\0"),
            Err(FrameError::InvalidEscape("\\t".into()))
        );
        assert_eq!(
            parse_frame("MESSAGE\n\nunterminated"),
            Err(FrameError::MissingTerminator)
        );
        assert_eq!(
            parse_frame("MESSAGE\ncontent-length:x\n\n\0"),
            Err(FrameError::InvalidContentLength("x".into()))
        );
    }
}
