//! Produces the plain-text and HTML renditions of a markup body.

use crate::config::Settings;

use super::asciidoc::split_option_string;
use super::{ConversionError, Invocation, Renderer};

/// Input format names that select the asciidoctor path.
pub const ASCIIDOC_FORMATS: [&str; 2] = ["asciidoc", "asciidoctor"];

/// Pandoc format name for the HTML part.
pub const HTML_FORMAT: &str = "html";

/// Asciidoctor backend for the HTML part.
pub const HTML_BACKEND: &str = "html5";

/// Asciidoctor backend (and pandoc reader) for the intermediate DocBook.
pub const DOCBOOK: &str = "docbook";

/// Returns true if `format` is rendered by asciidoctor.
#[must_use]
pub fn is_asciidoc(format: &str) -> bool {
    ASCIIDOC_FORMATS.contains(&format)
}

/// The two renditions of one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBodies {
    /// Text in the configured output format.
    pub plain: String,
    /// HTML rendition.
    pub html: String,
}

/// Runs the conversion steps over a [`Renderer`].
#[derive(Debug, Clone, Default)]
pub struct Converter<R> {
    renderer: R,
}

impl<R: Renderer> Converter<R> {
    /// Creates a converter around a renderer.
    #[must_use]
    pub const fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Returns the underlying renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Renders `body` into its plain-text and HTML forms.
    ///
    /// The plain part is the body itself when the input and output formats
    /// match. Otherwise AsciiDoc goes through asciidoctor to DocBook and then
    /// through pandoc, and every other format goes straight through pandoc.
    /// The HTML part comes from asciidoctor for AsciiDoc and from pandoc
    /// for everything else.
    ///
    /// # Errors
    ///
    /// Returns the first renderer failure; nothing is produced in that case.
    pub async fn render_both(
        &self,
        body: &str,
        settings: &Settings,
    ) -> Result<RenderedBodies, ConversionError> {
        let in_format = settings.in_format();
        let out_format = settings.out_format();

        let asciidoctor_args = if is_asciidoc(in_format) {
            Some(asciidoctor_args(settings)?)
        } else {
            None
        };

        let plain = if in_format == out_format {
            tracing::debug!("Input and output formats are both '{in_format}', keeping body as is");
            body.to_string()
        } else if let Some(args) = &asciidoctor_args {
            let docbook = self
                .run(Invocation::asciidoctor(args.clone(), DOCBOOK), body.as_bytes())
                .await?;
            self.run(Invocation::pandoc(DOCBOOK, out_format), docbook.as_bytes())
                .await?
        } else {
            self.run(Invocation::pandoc(in_format, out_format), body.as_bytes())
                .await?
        };

        let html = match asciidoctor_args {
            Some(args) => {
                self.run(Invocation::asciidoctor(args, HTML_BACKEND), body.as_bytes())
                    .await?
            }
            None => {
                self.run(Invocation::pandoc(in_format, HTML_FORMAT), body.as_bytes())
                    .await?
            }
        };

        Ok(RenderedBodies { plain, html })
    }

    async fn run(&self, invocation: Invocation, input: &[u8]) -> Result<String, ConversionError> {
        let tool = invocation.tool;
        let output = self.renderer.render(&invocation, input).await?;
        String::from_utf8(output).map_err(|source| ConversionError::InvalidOutput { tool, source })
    }
}

/// Encoded option-bag tokens followed by the raw extra option tokens.
fn asciidoctor_args(settings: &Settings) -> Result<Vec<String>, ConversionError> {
    let mut args = settings.asciidoctor_options().encode();
    args.extend(split_option_string(settings.asciidoctor_options_string())?);
    Ok(args)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::{SettingKey, Value, ValueMap, declare_defaults};
    use crate::convert::Tool;

    /// Records invocations and answers with a tagged echo of the input.
    #[derive(Default)]
    struct FakeRenderer {
        calls: Mutex<Vec<Invocation>>,
        fail_on: Option<Tool>,
        invalid_utf8: bool,
    }

    impl FakeRenderer {
        fn failing(tool: Tool) -> Self {
            Self {
                fail_on: Some(tool),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Renderer for FakeRenderer {
        async fn render(
            &self,
            invocation: &Invocation,
            input: &[u8],
        ) -> Result<Vec<u8>, ConversionError> {
            self.calls.lock().unwrap().push(invocation.clone());
            if self.fail_on == Some(invocation.tool) {
                return Err(ConversionError::Failed {
                    tool: invocation.tool,
                    status: "exit code 1".into(),
                    stderr: "boom".into(),
                });
            }
            if self.invalid_utf8 {
                return Ok(vec![0xff, 0xfe]);
            }
            let target = invocation.args.last().cloned().unwrap_or_default();
            let mut out = format!("[{} {target}]", invocation.tool).into_bytes();
            out.extend_from_slice(input);
            Ok(out)
        }
    }

    fn settings(in_format: &str, out_format: &str) -> Settings {
        declare_defaults()
            .with_value(SettingKey::InFormat, Value::from(in_format))
            .unwrap()
            .with_value(SettingKey::OutFormat, Value::from(out_format))
            .unwrap()
    }

    #[tokio::test]
    async fn same_formats_keep_plain_body_and_render_html_with_pandoc() {
        let converter = Converter::new(FakeRenderer::default());

        let bodies = converter
            .render_both("Hello **world**", &settings("commonmark", "commonmark"))
            .await
            .unwrap();

        assert_eq!(bodies.plain, "Hello **world**");
        assert_eq!(bodies.html, "[pandoc html]Hello **world**");
        assert_eq!(
            converter.renderer().calls(),
            vec![Invocation::pandoc("commonmark", "html")]
        );
    }

    #[tokio::test]
    async fn different_formats_render_plain_with_pandoc() {
        let converter = Converter::new(FakeRenderer::default());

        let bodies = converter
            .render_both("*hi*", &settings("markdown", "plain"))
            .await
            .unwrap();

        assert_eq!(bodies.plain, "[pandoc plain]*hi*");
        assert_eq!(
            converter.renderer().calls(),
            vec![
                Invocation::pandoc("markdown", "plain"),
                Invocation::pandoc("markdown", HTML_FORMAT),
            ]
        );
    }

    #[tokio::test]
    async fn asciidoc_goes_through_docbook_for_plain_part() {
        let converter = Converter::new(FakeRenderer::default());

        let bodies = converter
            .render_both("= Title", &settings("asciidoc", "commonmark"))
            .await
            .unwrap();

        assert_eq!(bodies.plain, "[pandoc commonmark][asciidoctor -]= Title");
        assert_eq!(bodies.html, "[asciidoctor -]= Title");

        let calls = converter.renderer().calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Invocation::asciidoctor(vec![], DOCBOOK));
        assert_eq!(calls[1], Invocation::pandoc(DOCBOOK, "commonmark"));
        assert_eq!(calls[2], Invocation::asciidoctor(vec![], HTML_BACKEND));
    }

    #[tokio::test]
    async fn asciidoctor_alias_selects_asciidoc_path() {
        let converter = Converter::new(FakeRenderer::default());

        converter
            .render_both("text", &settings("asciidoctor", "asciidoctor"))
            .await
            .unwrap();

        assert_eq!(
            converter.renderer().calls(),
            vec![Invocation::asciidoctor(vec![], HTML_BACKEND)]
        );
    }

    #[tokio::test]
    async fn asciidoctor_receives_encoded_and_raw_options() {
        let converter = Converter::new(FakeRenderer::default());
        let bag = ValueMap::new()
            .with("safe-mode", "safe")
            .with("attribute", ValueMap::new().with("toc", true));
        let settings = settings("asciidoc", "asciidoc")
            .with_value(SettingKey::AsciidoctorOptions, Value::Map(bag))
            .unwrap()
            .with_value(
                SettingKey::AsciidoctorOptionsString,
                Value::from("--trace -a 'title=A B'"),
            )
            .unwrap();

        converter.render_both("x", &settings).await.unwrap();

        let calls = converter.renderer().calls();
        assert_eq!(
            calls[0].args,
            vec![
                "--safe-mode",
                "safe",
                "--attribute=toc",
                "--trace",
                "-a",
                "title=A B",
                "-b",
                "html5",
                "-o",
                "-",
                "-",
            ]
        );
    }

    #[tokio::test]
    async fn renderer_failure_stops_conversion() {
        let converter = Converter::new(FakeRenderer::failing(Tool::Pandoc));

        let result = converter
            .render_both("x", &settings("markdown", "plain"))
            .await;

        assert!(matches!(
            result,
            Err(ConversionError::Failed {
                tool: Tool::Pandoc,
                ..
            })
        ));
        assert_eq!(converter.renderer().calls().len(), 1);
    }

    #[tokio::test]
    async fn non_utf8_output_is_rejected() {
        let converter = Converter::new(FakeRenderer {
            invalid_utf8: true,
            ..FakeRenderer::default()
        });

        let result = converter
            .render_both("x", &settings("commonmark", "commonmark"))
            .await;

        assert!(matches!(result, Err(ConversionError::InvalidOutput { .. })));
    }

    #[tokio::test]
    async fn malformed_raw_options_fail_before_any_render() {
        let converter = Converter::new(FakeRenderer::default());
        let settings = settings("asciidoc", "plain")
            .with_value(SettingKey::AsciidoctorOptionsString, Value::from("-a 'open"))
            .unwrap();

        let result = converter.render_both("x", &settings).await;

        assert!(matches!(result, Err(ConversionError::Options(_))));
        assert!(converter.renderer().calls().is_empty());
    }
}
