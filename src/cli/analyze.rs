//! `catalyst analyze` command
//!
//! Reads a transcript as JSON (`[{speaker, text}]` or `{"turns": [...]}`)
//! or as plain `Speaker: text` lines.

use anyhow::{Context, Result};
use catalyst_core::{
    format_error_for_cli, AnalysisRequest, AnalysisService, AnalysisType, ConversationTurn,
};
use clap::Args;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Analysis type (sentiment, communication_patterns, conflict_detection,
    /// interventions, summary, comprehensive)
    #[arg(long = "type", short = 't')]
    pub analysis_type: AnalysisType,
    /// Transcript file; reads stdin when omitted
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
    /// Provider to try first
    #[arg(long, short = 'p')]
    pub provider: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptJson {
    Turns(Vec<ConversationTurn>),
    Wrapped { turns: Vec<ConversationTurn> },
}

/// Parse a transcript from JSON or `Speaker: text` lines
///
/// Lines without a speaker prefix continue the previous turn.
pub fn parse_transcript(input: &str) -> Vec<ConversationTurn> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<TranscriptJson>(trimmed) {
            return match parsed {
                TranscriptJson::Turns(turns) | TranscriptJson::Wrapped { turns } => turns,
            };
        }
    }

    let mut turns: Vec<ConversationTurn> = Vec::new();
    for line in input.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match line.split_once(':') {
            Some((speaker, text)) if is_speaker(speaker) => {
                turns.push(ConversationTurn::new(speaker.trim(), text.trim()));
            }
            _ => match turns.last_mut() {
                Some(last) => {
                    last.text.push(' ');
                    last.text.push_str(line);
                }
                None => turns.push(ConversationTurn::new("Unknown", line)),
            },
        }
    }
    turns
}

fn is_speaker(candidate: &str) -> bool {
    let candidate = candidate.trim();
    !candidate.is_empty() && candidate.chars().count() <= 40 && !candidate.contains("http")
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read transcript from stdin")?;
            Ok(buf)
        }
    }
}

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    let (config, router) = crate::server::init_from_env()?;
    let service = AnalysisService::with_config(router, config.analysis);

    let turns = parse_transcript(&read_input(args.file.as_ref())?);
    let mut request = AnalysisRequest::new(args.analysis_type, turns);
    request.preferred_provider = args.provider;

    match service.route_analysis_request(request).await {
        Ok(outcome) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome).context("Failed to serialize result")?
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format_error_for_cli(&e));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let turns = parse_transcript(r#"[{"speaker": "Alex", "text": "Hi"}]"#);
        assert_eq!(turns, vec![ConversationTurn::new("Alex", "Hi")]);
    }

    #[test]
    fn test_parse_wrapped_json() {
        let turns = parse_transcript(r#"{"turns": [{"speaker": "Sam", "text": "Hey"}]}"#);
        assert_eq!(turns[0].speaker, "Sam");
    }

    #[test]
    fn test_parse_plain_lines() {
        let input = "Alex: You never help.\n\nSam: I did on Sunday,\nand on Monday.\n";
        let turns = parse_transcript(input);

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].speaker, "Sam");
        assert_eq!(turns[1].text, "I did on Sunday, and on Monday.");
    }

    #[test]
    fn test_parse_line_without_speaker() {
        let turns = parse_transcript("we argued again");
        assert_eq!(turns[0].speaker, "Unknown");
    }
}
