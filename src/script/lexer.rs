//! Lexer for interaction scripts using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Mode keywords
    #[token("edit")]
    Edit,
    #[token("on")]
    On,
    #[token("off")]
    Off,
    #[token("viewport")]
    Viewport,
    #[token("frame")]
    Frame,

    // Pointer keywords
    #[token("grab")]
    Grab,
    #[token("at")]
    At,
    #[token("move")]
    Move,
    #[token("drop")]
    Drop,
    #[token("cancel")]
    Cancel,
    #[token("drag")]
    Drag,
    #[token("resize")]
    Resize,
    #[token("to")]
    To,

    // Stack keywords
    #[token("cycle")]
    Cycle,
    #[token("next")]
    Next,
    #[token("prev")]
    Prev,
    #[token("select")]
    Select,
    #[token("expand")]
    Expand,
    #[token("close")]
    Close,
    #[token("unlink")]
    Unlink,
    #[token("relink")]
    Relink,
    #[token("stack")]
    Stack,

    // Widget keywords
    #[token("lock")]
    Lock,
    #[token("unlock")]
    Unlock,
    #[token("collapse")]
    Collapse,

    // Paint order keywords
    #[token("front")]
    Front,
    #[token("back")]
    Back,
    #[token("forward")]
    Forward,
    #[token("backward")]
    Backward,

    #[token(",")]
    Comma,
    #[token("-")]
    Minus,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_pointer_keywords() {
        assert_eq!(
            tokens("grab clock at 30, 30"),
            vec![
                Token::Grab,
                Token::Ident("clock".to_string()),
                Token::At,
                Token::Number(30.0),
                Token::Comma,
                Token::Number(30.0),
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        // `edited` and `stacked` are ids, not keywords
        assert_eq!(
            tokens("edited stacked"),
            vec![
                Token::Ident("edited".to_string()),
                Token::Ident("stacked".to_string()),
            ]
        );
    }

    #[test]
    fn test_identifiers_with_dashes_and_quotes() {
        assert_eq!(
            tokens(r#"todo-list "next""#),
            vec![
                Token::Ident("todo-list".to_string()),
                Token::String("next".to_string()),
            ]
        );
    }

    #[test]
    fn test_negative_numbers_lex_as_minus() {
        assert_eq!(
            tokens("move -10, 2.5"),
            vec![
                Token::Move,
                Token::Minus,
                Token::Number(10.0),
                Token::Comma,
                Token::Number(2.5),
            ]
        );
    }

    #[test]
    fn test_comments_skipped() {
        assert_eq!(
            tokens("drop // release\n/* block\ncomment */ frame 2"),
            vec![Token::Drop, Token::Frame, Token::Number(2.0)]
        );
    }
}
