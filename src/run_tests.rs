//! Tests for the run module.

use super::*;

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use multimark::config::{SettingKey, Value, declare_defaults};
use multimark::convert::{Invocation, Tool, ToolPaths};
use mail_parser::{MessageParser, MimeHeaders};

/// Renderer that wraps its input in a marker naming the target format.
#[derive(Default)]
struct MockRenderer {
    calls: AtomicUsize,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockRenderer {
    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Renderer for MockRenderer {
    async fn render(&self, invocation: &Invocation, input: &[u8]) -> Result<Vec<u8>, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.invocations.lock().unwrap().push(invocation.clone());
        let target = invocation.args.last().cloned().unwrap_or_default();
        let mut out = format!("<{target}>").into_bytes();
        out.extend_from_slice(input);
        Ok(out)
    }
}

fn settings(pairs: &[(SettingKey, &str)]) -> Settings {
    pairs.iter().fold(declare_defaults(), |settings, (key, value)| {
        settings.with_value(*key, Value::from(*value)).unwrap()
    })
}

fn path_str(path: &std::path::Path) -> &str {
    path.to_str().unwrap()
}

mod run_error {
    use super::*;

    #[test]
    fn input_error_names_path() {
        let error = RunError::Input {
            path: PathBuf::from("/tmp/mail.eml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(error.to_string(), "Failed to read input '/tmp/mail.eml': gone");
    }

    #[test]
    fn stdio_is_described_as_stream() {
        let error = RunError::Output {
            path: PathBuf::from("-"),
            source: std::io::Error::other("broken pipe"),
        };
        assert_eq!(
            error.to_string(),
            "Failed to write output (standard stream): broken pipe"
        );
    }

    #[test]
    fn conversion_error_wraps_source() {
        let error = RunError::from(ConversionError::Failed {
            tool: Tool::Pandoc,
            status: "exit code 64".into(),
            stderr: "Unknown input format".into(),
        });
        assert_eq!(
            error.to_string(),
            "Conversion failed: pandoc failed (exit code 64): Unknown input format"
        );
    }
}

mod transform {
    use super::*;

    #[tokio::test]
    async fn single_part_commonmark_becomes_alternative() {
        let converter = Converter::new(MockRenderer::default());
        let settings = settings(&[]);

        let out = transform(b"Subject: hi\n\nHello **world**\n", &settings, &converter)
            .await
            .unwrap();

        let parsed = MessageParser::new().parse(&out).unwrap();
        assert!(parsed.is_content_type("multipart", "alternative"));
        assert_eq!(parsed.body_text(0).unwrap(), "Hello **world**\n");
        assert_eq!(parsed.body_html(0).unwrap(), "<html>Hello **world**\n");
        assert_eq!(converter.renderer().call_count(), 1);
    }

    #[tokio::test]
    async fn multipart_attachment_survives_conversion() {
        let converter = Converter::new(MockRenderer::default());
        let settings = settings(&[(SettingKey::OutFormat, "plain")]);
        let attachment = b"Content-Type: application/octet-stream\n\
Content-Disposition: attachment; filename=\"x.bin\"\n\
Content-Transfer-Encoding: base64\n\
\n\
AAEC";
        let mut raw = b"Content-Type: multipart/mixed; boundary=\"b\"\n\
\n\
--b\n\
Content-Type: text/markdown\n\
\n\
# Title\n\
--b\n"
            .to_vec();
        raw.extend_from_slice(attachment);
        raw.extend_from_slice(b"\n--b--\n");

        let out = transform(&raw, &settings, &converter).await.unwrap();

        let message = Message::parse(&out).unwrap();
        assert_eq!(message.attachments().collect::<Vec<_>>(), vec![attachment.as_slice()]);
        assert_eq!(message.source_text(), "<plain># Title");
        assert_eq!(converter.renderer().call_count(), 2);
    }

    #[tokio::test]
    async fn malformed_message_is_a_message_error() {
        let converter = Converter::new(MockRenderer::default());

        let result = transform(
            b"Content-Type: multipart/mixed\n\nbody\n",
            &settings(&[]),
            &converter,
        )
        .await;

        assert!(matches!(result, Err(RunError::Message(_))));
        assert_eq!(converter.renderer().call_count(), 0);
    }
}

mod execute {
    use super::*;

    #[tokio::test]
    async fn converts_file_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.eml");
        let output = dir.path().join("out.eml");
        std::fs::write(&input, "Subject: hi\n\nHello **world**\n").unwrap();
        let settings = settings(&[
            (SettingKey::Infile, path_str(&input)),
            (SettingKey::Outfile, path_str(&output)),
        ]);
        let converter = Converter::new(MockRenderer::default());

        execute_with(&settings, &converter).await.unwrap();

        let written = std::fs::read(&output).unwrap();
        let parsed = MessageParser::new().parse(&written).unwrap();
        assert_eq!(parsed.subject(), Some("hi"));
        assert!(parsed.is_content_type("multipart", "alternative"));
    }

    #[tokio::test]
    async fn missing_renderer_binary_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.eml");
        let output = dir.path().join("out.eml");
        std::fs::write(&input, "Subject: hi\n\nHello **world**\n").unwrap();
        let settings = settings(&[
            (SettingKey::Infile, path_str(&input)),
            (SettingKey::Outfile, path_str(&output)),
        ]);
        let renderer = ProcessRenderer::with_paths(
            ToolPaths::default().with(Tool::Pandoc, dir.path().join("no-such-pandoc")),
        );

        let result = execute_with(&settings, &Converter::new(renderer)).await;

        assert!(matches!(
            result,
            Err(RunError::Conversion(ConversionError::Launch { .. }))
        ));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn missing_input_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.eml");
        let output = dir.path().join("out.eml");
        let settings = settings(&[
            (SettingKey::Infile, path_str(&input)),
            (SettingKey::Outfile, path_str(&output)),
        ]);
        let converter = Converter::new(MockRenderer::default());

        let result = execute_with(&settings, &converter).await;

        assert!(matches!(result, Err(RunError::Input { .. })));
        assert_eq!(converter.renderer().call_count(), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn unwritable_output_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.eml");
        let output = dir.path().join("no-such-dir").join("out.eml");
        std::fs::write(&input, "Subject: x\n\nHello\n").unwrap();
        let settings = settings(&[
            (SettingKey::Infile, path_str(&input)),
            (SettingKey::Outfile, path_str(&output)),
        ]);
        let converter = Converter::new(MockRenderer::default());

        let result = execute_with(&settings, &converter).await;

        assert!(matches!(result, Err(RunError::Output { .. })));
        assert_eq!(converter.renderer().call_count(), 1);
    }

    #[tokio::test]
    async fn unexpandable_path_is_a_path_error() {
        let settings = settings(&[(
            SettingKey::Infile,
            "$MULTIMARK_TEST_SURELY_UNSET_VARIABLE/in.eml",
        )]);
        let converter = Converter::new(MockRenderer::default());

        let result = execute_with(&settings, &converter).await;

        assert!(matches!(result, Err(RunError::Path(_))));
    }
}
