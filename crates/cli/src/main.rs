use anamnese_codec::passphrase::{generate_base62, generate_chars};
use anamnese_codec::{AnswerSet, CodecConfig, DualCodec, OsRandom, RawAnswer};
use anamnese_types::Passphrase;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "anamnese")]
#[command(about = "Encode questionnaire answers into a public code and an encrypted payload")]
struct Cli {
    /// Do not deflate the static code (must match between encode and decode)
    #[arg(long, global = true)]
    no_compress: bool,

    /// Comma-separated private kinds, e.g. "text,pii,date,number"
    #[arg(long, global = true)]
    private_kinds: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an answers JSON file ("-" for stdin)
    Encode {
        /// Answers JSON file
        #[arg(long, default_value = "-")]
        input: PathBuf,
        /// Passphrase (generated when omitted)
        #[arg(long, env = "ANAMNESE_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<Passphrase>,
    },
    /// Decode a static code and private payload back into answers
    Decode {
        #[arg(long)]
        static_code: String,
        #[arg(long)]
        payload: String,
        #[arg(long, env = "ANAMNESE_PASSPHRASE", hide_env_values = true)]
        passphrase: Passphrase,
    },
    /// Decode only the static code (no passphrase needed)
    DecodeStatic {
        #[arg(long)]
        static_code: String,
    },
    /// Decrypt only the private payload
    DecodePrivate {
        #[arg(long)]
        payload: String,
        #[arg(long, env = "ANAMNESE_PASSPHRASE", hide_env_values = true)]
        passphrase: Passphrase,
    },
    /// Generate a passphrase
    Passphrase {
        /// Number of characters (defaults to ANAMNESE_PASSPHRASE_LENGTH or 12)
        #[arg(long)]
        length: Option<usize>,
        /// Base62 rendering of 32 random bytes instead
        #[arg(long, conflicts_with = "length")]
        bytes: bool,
    },
    /// Encode and decode a built-in sample
    SelfTest,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("anamnese=info".parse()?)
                .add_directive("anamnese_codec=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.no_compress, cli.private_kinds)?;
    let codec = DualCodec::new(config);

    match cli.command {
        Some(Commands::Encode { input, passphrase }) => {
            let answers = read_answers(&input)?;
            let encoded = codec.encode_dual(&answers, passphrase)?;
            println!("{}", serde_json::to_string_pretty(&encoded)?);
        }
        Some(Commands::Decode {
            static_code,
            payload,
            passphrase,
        }) => {
            let decoded = codec.decode_dual(&static_code, &payload, &passphrase)?;
            println!("{}", serde_json::to_string_pretty(&decoded.answers)?);
        }
        Some(Commands::DecodeStatic { static_code }) => {
            let view = codec.decode_static(&static_code)?;
            println!("{}", serde_json::to_string_pretty(&view.answers)?);
        }
        Some(Commands::DecodePrivate {
            payload,
            passphrase,
        }) => {
            let private = codec.decode_private(&payload, &passphrase)?;
            println!("{}", serde_json::to_string_pretty(&private)?);
        }
        Some(Commands::Passphrase { length, bytes }) => {
            let passphrase = if bytes {
                generate_base62(&OsRandom)?
            } else {
                let length = length.unwrap_or(codec.config().passphrase_length());
                generate_chars(&OsRandom, length)?
            };
            println!("{}", passphrase.expose());
        }
        Some(Commands::SelfTest) => {
            let report = self_test(&codec)?;
            println!("static code length: {}", report.static_code_len);
            println!("private payload length: {}", report.private_payload_len);
            println!("decode ok: true");
        }
        None => {
            println!("Use 'anamnese --help' for commands");
        }
    }

    Ok(())
}

/// Environment first, then command-line overrides.
fn resolve_config(no_compress: bool, private_kinds: Option<String>) -> anyhow::Result<CodecConfig> {
    let config = CodecConfig::from_env_values(
        std::env::var("ANAMNESE_COMPRESS").ok(),
        std::env::var("ANAMNESE_PASSPHRASE_LENGTH").ok(),
        private_kinds.or_else(|| std::env::var("ANAMNESE_PRIVATE_KINDS").ok()),
    )
    .context("invalid codec configuration")?;

    Ok(if no_compress {
        config.with_compress(false)
    } else {
        config
    })
}

fn read_answers(input: &Path) -> anyhow::Result<AnswerSet> {
    let mut contents = String::new();
    if input == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut contents)
            .context("failed to read answers from stdin")?;
    } else {
        contents = std::fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
    }
    serde_json::from_str(&contents).context("answers must be a JSON object of question id -> answer")
}

struct SelfTestReport {
    static_code_len: usize,
    private_payload_len: usize,
}

/// Round-trips a fixed sample. Reports sizes only; decoded content is never printed.
fn self_test(codec: &DualCodec) -> anyhow::Result<SelfTestReport> {
    let answers: AnswerSet = [
        ("0002", RawAnswer::Select { index: 1 }),
        ("1000", RawAnswer::Select { index: 1 }),
        (
            "1005",
            RawAnswer::Multi {
                indices: vec![0, 2, 4],
                free_text: Some("andere Auffälligkeit: starkes Frieren".into()),
            },
        ),
        ("3003", RawAnswer::text("pii", "name@example.com")),
        ("3004", RawAnswer::text("pii", "+49 170 1234567")),
        ("4001", RawAnswer::Number { value: 83 }),
        ("9900", RawAnswer::Select { index: 4 }),
    ]
    .into_iter()
    .collect();

    let passphrase = generate_base62(&OsRandom)?;
    let encoded = codec.encode_dual(&answers, Some(passphrase))?;
    let decoded = codec.decode_dual(
        &encoded.static_code,
        &encoded.private_payload,
        &encoded.passphrase,
    )?;

    anyhow::ensure!(decoded.answers == answers, "self-test round trip mismatch");
    tracing::info!(
        static_code_len = encoded.static_code.len(),
        private_payload_len = encoded.private_payload.len(),
        "self-test passed"
    );

    Ok(SelfTestReport {
        static_code_len: encoded.static_code.len(),
        private_payload_len: encoded.private_payload.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_encode() {
        let cli = Cli::try_parse_from([
            "anamnese",
            "--no-compress",
            "encode",
            "--input",
            "answers.json",
            "--passphrase",
            "correct-horse-battery",
        ])
        .unwrap();

        assert!(cli.no_compress);
        match cli.command {
            Some(Commands::Encode { input, passphrase }) => {
                assert_eq!(input, PathBuf::from("answers.json"));
                assert_eq!(
                    passphrase.as_ref().map(Passphrase::expose),
                    Some("correct-horse-battery")
                );
            }
            _ => panic!("expected encode"),
        }
    }

    #[test]
    fn test_cli_rejects_short_passphrase() {
        let result = Cli::try_parse_from([
            "anamnese",
            "decode-private",
            "--payload",
            "v1.a.b.c",
            "--passphrase",
            "too-short",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_passphrase_flags_conflict() {
        let result = Cli::try_parse_from(["anamnese", "passphrase", "--length", "16", "--bytes"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_read_answers_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("answers.json");
        std::fs::write(
            &path,
            r#"{"0002": {"kind": "select", "index": 1}, "3003": {"kind": "pii", "text": "x"}}"#,
        )
        .unwrap();

        let answers = read_answers(&path).unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("0002"), Some(&RawAnswer::Select { index: 1 }));
    }

    #[test]
    fn test_read_answers_rejects_non_object() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("answers.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(read_answers(&path).is_err());
    }

    #[test]
    fn test_read_answers_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(read_answers(&temp.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_self_test_round_trips() {
        let codec = DualCodec::default();
        let report = self_test(&codec).unwrap();
        assert!(report.static_code_len > 0);
        assert!(report.private_payload_len > 0);
    }
}
