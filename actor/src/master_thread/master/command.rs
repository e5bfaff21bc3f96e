use super::Query;
use std::path::PathBuf;

#[derive(Debug, PartialEq)]
pub enum Command {
    Save(Option<PathBuf>),
    Load(Option<PathBuf>),
    Hold,
    Resume,
    Close,
    Query(Query),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let words = line.split_whitespace().collect::<Vec<_>>();
        let command = match words[..] {
            ["save"] => Self::Save(None),
            ["save", path] => Self::Save(Some(path.into())),
            ["load"] => Self::Load(None),
            ["load", path] => Self::Load(Some(path.into())),
            ["hold"] => Self::Hold,
            ["resume"] => Self::Resume,
            ["close"] => Self::Close,
            ["query", what] => Self::Query(match what {
                "n_step" => Query::NStep,
                "eps" => Query::Eps,
                "phase" => Query::Phase,
                "memory" => Query::Memory,
                "ticks" => Query::Ticks,
                _ => return None,
            }),
            _ => return None,
        };
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("save"), Some(Command::Save(None)));
        assert_eq!(
            Command::parse("  load  runs/best \n"),
            Some(Command::Load(Some("runs/best".into())))
        );
        assert_eq!(Command::parse("hold"), Some(Command::Hold));
        assert_eq!(Command::parse("resume"), Some(Command::Resume));
        assert_eq!(Command::parse("close"), Some(Command::Close));
        assert_eq!(
            Command::parse("query eps"),
            Some(Command::Query(Query::Eps))
        );
    }

    #[test]
    fn rejects_unknown_commands() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("jump"), None);
        assert_eq!(Command::parse("query everything"), None);
        assert_eq!(Command::parse("save a b"), None);
    }
}
