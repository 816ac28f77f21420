use anyhow::{anyhow, Context, Result};
use std::fs;
use tracing::warn;

use super::{Direction, ResolveFuture};

/// Line-aligned parallel corpus: line N of the source file translates line N
/// of the target file. Lookup is first-line-containing-phrase on the from
/// side, then a direct index into the to side.
#[derive(Debug, Clone)]
pub struct CorpusResolver {
    source_lines: Vec<String>,
    target_lines: Vec<String>,
}

impl CorpusResolver {
    pub fn load(source_path: &str, target_path: &str) -> Result<Self> {
        let source_lines = read_lines(source_path)?;
        let target_lines = read_lines(target_path)?;
        if source_lines.len() != target_lines.len() {
            // Alignment is an authoring invariant we cannot repair; a
            // mismatch past the shorter file resolves as a miss.
            warn!(
                "corpus files are not line-aligned: {} has {} lines, {} has {}",
                source_path,
                source_lines.len(),
                target_path,
                target_lines.len()
            );
        }
        Ok(Self {
            source_lines,
            target_lines,
        })
    }

    pub fn resolve(&self, phrase: &str, direction: Direction) -> ResolveFuture {
        let result = self.lookup(phrase, direction);
        Box::pin(async move { result })
    }

    fn lookup(&self, phrase: &str, direction: Direction) -> Result<String> {
        if phrase.is_empty() {
            return Err(anyhow!("cannot resolve an empty phrase"));
        }
        let (from, to) = match direction {
            Direction::SourceToTarget => (&self.source_lines, &self.target_lines),
            Direction::TargetToSource => (&self.target_lines, &self.source_lines),
        };
        let Some(index) = from.iter().position(|line| line.contains(phrase)) else {
            return Err(anyhow!("no corpus line contains '{}'", phrase));
        };
        to.get(index).cloned().ok_or_else(|| {
            anyhow!(
                "corpus line {} has no counterpart in the paired file",
                index + 1
            )
        })
    }
}

fn read_lines(path: &str) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read corpus: {}", path))?;
    Ok(content.lines().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn corpus_pair(source: &str, target: &str) -> (tempfile::NamedTempFile, tempfile::NamedTempFile)
    {
        let mut source_file = tempfile::NamedTempFile::new().expect("source file");
        write!(source_file, "{}", source).expect("write source");
        let mut target_file = tempfile::NamedTempFile::new().expect("target file");
        write!(target_file, "{}", target).expect("write target");
        (source_file, target_file)
    }

    fn load(source: &str, target: &str) -> CorpusResolver {
        let (source_file, target_file) = corpus_pair(source, target);
        CorpusResolver::load(
            source_file.path().to_str().expect("source path"),
            target_file.path().to_str().expect("target path"),
        )
        .expect("load corpus")
    }

    #[test]
    fn matched_line_number_indexes_the_paired_file() {
        let corpus = load("早上好\n再见\n你好\n", "good morning\ngoodbye\nhello\n");
        let result = corpus
            .lookup("你好", Direction::SourceToTarget)
            .expect("resolve");
        assert_eq!(result, "hello");
    }

    #[test]
    fn containment_match_takes_the_first_line() {
        // Both lines contain the phrase; authoring order wins.
        let corpus = load("你好吗\n你好\n", "how are you\nhello\n");
        let result = corpus
            .lookup("你好", Direction::SourceToTarget)
            .expect("resolve");
        assert_eq!(result, "how are you");
    }

    #[test]
    fn reverse_direction_scans_the_target_file() {
        let corpus = load("你好\n", "hello\n");
        let result = corpus
            .lookup("hello", Direction::TargetToSource)
            .expect("resolve");
        assert_eq!(result, "你好");
    }

    #[test]
    fn miss_is_an_error_not_a_panic() {
        let corpus = load("你好\n", "hello\n");
        let err = corpus
            .lookup("不存在", Direction::SourceToTarget)
            .expect_err("miss");
        assert!(err.to_string().contains("no corpus line"));
    }

    #[test]
    fn misaligned_corpus_resolves_past_the_end_as_a_miss() {
        let corpus = load("你好\n再见\n", "hello\n");
        let err = corpus
            .lookup("再见", Direction::SourceToTarget)
            .expect_err("no counterpart line");
        assert!(err.to_string().contains("no counterpart"));
    }
}
