use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoolhubd");
    let mut child = Command::new(exe)
        .env_remove("SUPABASE_URL")
        .env_remove("SUPABASE_ANON_KEY")
        .env_remove("SUPABASE_SERVICE_ROLE_KEY")
        .env_remove("ENABLE_MONGO")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoolhubd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

#[test]
fn health_unknown_method_and_fallback_read() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health.get("ok").and_then(|v| v.as_bool()), Some(true));
    let channels = health
        .get("result")
        .and_then(|r| r.get("channels"))
        .cloned()
        .unwrap_or_default();
    assert_eq!(
        channels.get("privileged").and_then(|v| v.as_bool()),
        Some(false)
    );
    assert_eq!(channels.get("direct").and_then(|v| v.as_bool()), Some(false));

    let unknown = request(&mut stdin, &mut reader, "2", "nope.nothing", json!({}));
    assert_eq!(unknown.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        unknown
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    // Unconfigured credentials still answer tolerant reads with sample rows.
    let students = request(&mut stdin, &mut reader, "3", "students.list", json!({}));
    assert_eq!(students.get("ok").and_then(|v| v.as_bool()), Some(true));
    let count = students
        .get("result")
        .and_then(|r| r.get("rows"))
        .and_then(|v| v.as_array())
        .map(Vec::len);
    assert_eq!(count, Some(283));

    let bad = request(&mut stdin, &mut reader, "4", "students.get", json!({}));
    assert_eq!(
        bad.get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("bad_params")
    );

    let diagnose = request(&mut stdin, &mut reader, "5", "auth.diagnose", json!({}));
    assert_eq!(
        diagnose
            .get("result")
            .and_then(|r| r.get("hasServiceKey"))
            .and_then(|v| v.as_bool()),
        Some(false)
    );
}
