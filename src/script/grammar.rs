//! Script parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::canvas::CycleDirection;
use crate::geometry::Point;
use crate::model::WidgetId;
use crate::store::ZOrder;

use super::ast::*;
use super::lexer::{lex, Token};

/// Parse script source into commands
pub fn parse(input: &str) -> Result<Script, Vec<crate::ScriptError>> {
    let len = input.len();

    let token_iter = lex(input).map(|(tok, span)| (tok, span.into()));

    // Split (Token, SimpleSpan) into token and span parts
    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    script_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn script_parser<'a, I>() -> impl Parser<'a, I, Script, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Widget ids are bare identifiers, or quoted when they clash with a keyword
    let widget = select! {
        Token::Ident(s) => WidgetId::new(s),
        Token::String(s) => WidgetId::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let number = just(Token::Minus)
        .or_not()
        .then(select! { Token::Number(n) => n })
        .map(|(neg, n)| if neg.is_some() { -n } else { n });

    let pair = number.clone().then_ignore(just(Token::Comma)).then(number);
    let point = pair.clone().map(|(x, y)| Point::new(x, y));

    let count = select! { Token::Number(n) => n }.try_map(|n, span| {
        if n.fract() == 0.0 && n <= u32::MAX as f64 {
            Ok(n as u32)
        } else {
            Err(Rich::custom(span, "frame count must be a whole number"))
        }
    });

    let edit = just(Token::Edit)
        .ignore_then(choice((
            just(Token::On).to(true),
            just(Token::Off).to(false),
        )))
        .map(Command::Edit);

    let viewport = just(Token::Viewport)
        .ignore_then(pair.clone())
        .map(|(width, height)| Command::Viewport { width, height });

    let frame = just(Token::Frame).ignore_then(count).map(Command::Frame);

    let grab = just(Token::Grab)
        .ignore_then(widget.clone())
        .then_ignore(just(Token::At))
        .then(point.clone())
        .map(|(id, at)| Command::Grab { id, at });

    let pointer_move = just(Token::Move).ignore_then(point.clone()).map(Command::Move);

    let drag = just(Token::Drag)
        .ignore_then(widget.clone())
        .then_ignore(just(Token::To))
        .then(point.clone())
        .map(|(id, to)| Command::Drag { id, to });

    let resize = just(Token::Resize)
        .ignore_then(widget.clone())
        .then_ignore(just(Token::To))
        .then(pair.clone())
        .map(|(id, (width, height))| Command::Resize { id, width, height });

    // `cycle clock` is `cycle clock next`
    let cycle = just(Token::Cycle)
        .ignore_then(widget.clone())
        .then(
            choice((
                just(Token::Next).to(CycleDirection::Next),
                just(Token::Prev).to(CycleDirection::Prev),
            ))
            .or_not(),
        )
        .map(|(id, direction)| Command::Cycle {
            id,
            direction: direction.unwrap_or(CycleDirection::Next),
        });

    let lock_target = choice((
        just(Token::Stack).ignore_then(widget.clone()).map(LockTarget::Stack),
        widget.clone().map(LockTarget::Widget),
    ));

    let order = choice((
        just(Token::Front).to(ZOrder::Front),
        just(Token::Back).to(ZOrder::Back),
        just(Token::Forward).to(ZOrder::Forward),
        just(Token::Backward).to(ZOrder::Backward),
    ))
    .then(widget.clone())
    .map(|(op, id)| Command::Order { id, op });

    let command = choice((
        edit,
        viewport,
        frame,
        grab,
        pointer_move,
        just(Token::Drop).to(Command::Drop),
        just(Token::Cancel).to(Command::Cancel),
        drag,
        resize,
        cycle,
        just(Token::Select).ignore_then(widget.clone()).map(Command::Select),
        just(Token::Expand).ignore_then(widget.clone()).map(Command::Expand),
        just(Token::Close).to(Command::Close),
        just(Token::Unlink).ignore_then(widget.clone()).map(Command::Unlink),
        just(Token::Relink).ignore_then(widget.clone()).map(Command::Relink),
        just(Token::Lock).ignore_then(lock_target.clone()).map(Command::Lock),
        just(Token::Unlock).ignore_then(lock_target).map(Command::Unlock),
        order,
        just(Token::Collapse).ignore_then(widget.clone()).map(Command::Collapse),
    ))
    .map_with(|command, e| Spanned::new(command, span_range(&e.span())))
    .boxed();

    command
        .repeated()
        .collect()
        .then_ignore(end())
        .map(|commands| Script { commands })
}
