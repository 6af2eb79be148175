use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "gator.v1";

#[derive(Serialize)]
pub struct Envelope<'a, T: Serialize> {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'a str,
    pub result: &'a T,
}

impl<'a, T: Serialize> Envelope<'a, T> {
    pub fn new(op: &'a str, result: &'a T) -> Self {
        Envelope { schema_version: SCHEMA_VERSION, time: Utc::now(), request_id: Uuid::new_v4(), op, result }
    }
}

pub fn write_result<T: Serialize, W: Write>(w: &mut W, op: &str, result: &T) -> Result<()> {
    serde_json::to_writer(&mut *w, &Envelope::new(op, result))?;
    writeln!(w)?;
    Ok(())
}

pub fn print_result<T: Serialize>(op: &str, result: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    write_result(&mut out, op, result)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn envelope_carries_op_and_result() {
        let mut buf = Vec::new();
        write_result(&mut buf, "browse", &json!({"posts": 2})).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert!(line.ends_with('\n'));

        let v: Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(v["schema_version"], "gator.v1");
        assert_eq!(v["op"], "browse");
        assert_eq!(v["result"]["posts"], 2);
        assert!(v["request_id"].is_string());
    }
}
