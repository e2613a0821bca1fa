use super::*;

fn one(line: &str) -> Result<Command, ParseError> {
    parse_tokens(&tokenize_line(line))
}

#[test]
fn declarations_with_scope_and_initializers() {
    let Ok(Command::Declare(d)) = one("global int score 5") else {
        panic!("expected declaration");
    };
    assert!(d.global);
    assert_eq!(d.ty, VarType::Int);
    assert_eq!(d.name, "score");
    assert_eq!(d.init, Some(Initializer::Value(Token::bare("5"))));

    let Ok(Command::Declare(d)) = one("real half {score / 2}") else {
        panic!("expected declaration");
    };
    assert!(!d.global);
    assert_eq!(d.init, Some(Initializer::Expr("score / 2".to_owned())));

    let Ok(Command::Declare(d)) = one("string name hello world") else {
        panic!("expected declaration");
    };
    assert_eq!(d.init, Some(Initializer::Value(Token::quoted("hello world"))));

    assert!(one("int").is_err());
    assert!(one("int 9lives").is_err());
}

#[test]
fn create_commands_keep_trailing_modifiers() {
    let Ok(Command::Create(c)) =
        one(r#"shape_create box rectangle "Hi" (10,20) (100,50) fill_color=(1,0,0,1) filled"#)
    else {
        panic!("expected create");
    };
    assert_eq!(c.kind, ElementKind::Shape(ShapeKind::Rectangle));
    assert_eq!(c.id, "box");
    assert_eq!(c.text, "Hi");
    assert_eq!(c.position, PointArg::Literal(Point::new(10.0, 20.0)));
    assert_eq!(c.size, PointArg::Literal(Point::new(100.0, 50.0)));
    assert_eq!(c.modifiers.len(), 2);

    let Ok(Command::Create(c)) = one(r#"note_create n "x" ({x},20) (1,1)"#) else {
        panic!("expected create");
    };
    assert_eq!(c.position, PointArg::Deferred("({x},20)".to_owned()));
}

#[test]
fn malformed_points_and_unknown_shapes_are_errors() {
    assert!(one(r#"note_create n "x" (1.5,2) (1,1)"#).is_err());
    assert!(one(r#"note_create n "x" (1,2)"#).is_err());
    assert!(one(r#"shape_create s blob "x" (1,2) (3,4)"#).is_err());
}

#[test]
fn connect_options_in_any_order() {
    let Ok(Command::Connect(c)) = one("connect a b double straight (1,0,0,1) wobbly") else {
        panic!("expected connect");
    };
    assert_eq!(c.kind, Some(ConnectionKind::Straight));
    assert_eq!(c.arrowhead, Some(Arrowhead::Double));
    assert_eq!(c.color, Some(Color::rgba(1.0, 0.0, 0.0, 1.0)));
    assert_eq!(c.unknown, vec!["wobbly".to_owned()]);

    let Ok(Command::Connect(c)) = one("connect a b color #00ff00") else {
        panic!("expected connect");
    };
    assert_eq!(c.color, Some(Color::rgba(0.0, 1.0, 0.0, 1.0)));

    assert!(one("connect a b (1,x,0)").is_err());
}

#[test]
fn animate_move_with_and_without_from() {
    let Ok(Command::Animate(a)) = one("animate_move box (0,0) (100,100) 0 1 ease_in") else {
        panic!("expected animate");
    };
    assert_eq!(
        a.motion,
        Motion::Move {
            from: Some(PointArg::Literal(Point::new(0.0, 0.0))),
            to: PointArg::Literal(Point::new(100.0, 100.0)),
        }
    );
    assert_eq!(a.start, NumArg::Literal(0.0));
    assert_eq!(a.duration, NumArg::Literal(1.0));
    assert_eq!(a.curve, Curve::EaseIn);

    let Ok(Command::Animate(a)) = one("animate_resize box (20,20) 0.5 {dur}") else {
        panic!("expected animate");
    };
    assert_eq!(
        a.motion,
        Motion::Resize {
            from: None,
            to: PointArg::Literal(Point::new(20.0, 20.0)),
        }
    );
    assert_eq!(a.duration, NumArg::Deferred("{dur}".to_owned()));
    assert_eq!(a.curve, Curve::Linear);
}

#[test]
fn animate_rotate_counts_numbers_for_from() {
    let Ok(Command::Animate(a)) = one("animate_rotate r 0 90 0 1") else {
        panic!("expected animate");
    };
    assert_eq!(
        a.motion,
        Motion::Rotate {
            from: Some(NumArg::Literal(0.0)),
            to: NumArg::Literal(90.0),
        }
    );

    let Ok(Command::Animate(a)) = one("animate_rotate r 90 0 1 bounce") else {
        panic!("expected animate");
    };
    assert_eq!(
        a.motion,
        Motion::Rotate {
            from: None,
            to: NumArg::Literal(90.0),
        }
    );
    assert_eq!(a.curve, Curve::Bounce);
}

#[test]
fn animate_errors() {
    assert!(one("animate_move box 0 1").is_err());
    assert!(one("animate_appear box 0").is_err());
    assert!(one("animate_appear box 0 1 wiggle").is_err());
    assert!(one("animate_color box (1,0,0) 0 1").is_err());
}

#[test]
fn auto_next_expected_value_kind() {
    assert_eq!(
        one("presentation_auto_next_if done 1").ok(),
        Some(Command::AutoNextIf {
            var: "done".to_owned(),
            expected: Expected::Number(1.0),
        })
    );
    assert_eq!(
        one(r#"presentation_auto_next_if answer "42""#).ok(),
        Some(Command::AutoNextIf {
            var: "answer".to_owned(),
            expected: Expected::Text("42".to_owned()),
        })
    );
}

#[test]
fn unknown_commands_are_not_errors() {
    assert_eq!(
        one("frobnicate 1 2").ok(),
        Some(Command::Unknown {
            name: "frobnicate".to_owned()
        })
    );
    assert_eq!(one(SLIDE_BREAK).ok(), Some(Command::SlideBreak));
}

#[test]
fn event_blocks_collect_their_body() {
    let script = "int n 0\non click btn\n  set n n + 1\n  # comment\nend\nnote_create a \"x\" (0,0) (1,1)\n";
    let lines = parse_script(script);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1].line, 2);
    let Ok(Command::On(block)) = &lines[1].command else {
        panic!("expected event block");
    };
    assert!(block.terminated);
    assert_eq!(block.kind, EventKind::Click);
    assert_eq!(block.target, "btn");
    assert_eq!(block.body.len(), 2);
    assert_eq!(block.body[0].line, 3);
    assert_eq!(lines[2].line, 6);
}

#[test]
fn nested_blocks_match_their_own_end() {
    let script = "on click a\non click b\nset x 1\nend\nend\nset y 2";
    let lines = parse_script(script);
    assert_eq!(lines.len(), 2);
    let Ok(Command::On(block)) = &lines[0].command else {
        panic!("expected event block");
    };
    assert_eq!(block.body.len(), 3);
}

#[test]
fn unterminated_block_leaves_the_rest_runnable() {
    let lines = parse_script("on click a\nset x 1\n");
    assert_eq!(lines.len(), 2);
    let Ok(Command::On(block)) = &lines[0].command else {
        panic!("expected event block");
    };
    assert!(!block.terminated);
    assert!(block.body.is_empty());
    assert!(matches!(lines[1].command, Ok(Command::Set { .. })));
}

#[test]
fn variable_event_conditions() {
    let lines = parse_script("on variable score >= 10\nend");
    let Ok(Command::On(block)) = &lines[0].command else {
        panic!("expected event block");
    };
    assert_eq!(block.condition, Condition::Compare(CompareOp::Ge, 10.0));

    let lines = parse_script("on click a >= 10\nend");
    assert!(lines[0].command.is_err());
}
