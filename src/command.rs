use std::str::FromStr;

use winnow::prelude::*;
use winnow::ascii::{float, space0, space1};
use winnow::combinator::{alt, opt, preceded, separated};
use winnow::token::take_while;

use crate::config::LineType;
use crate::display::Position;

/// Toolbar buttons, by the names the toolbar emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarCommand {
    Undo,
    Redo,
    GridOn,
    ZoomIn,
    ZoomOut,
    Copy,
    Paste,
    Fit,
    Delete,
    Line(LineType),
}

impl FromStr for ToolbarCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "undo" => ToolbarCommand::Undo,
            "redo" => ToolbarCommand::Redo,
            "gridon" => ToolbarCommand::GridOn,
            "zoomin" => ToolbarCommand::ZoomIn,
            "zoomout" => ToolbarCommand::ZoomOut,
            "copy" => ToolbarCommand::Copy,
            "paste" => ToolbarCommand::Paste,
            "fit" => ToolbarCommand::Fit,
            "delete" => ToolbarCommand::Delete,
            "line-bezier" => ToolbarCommand::Line(LineType::Bezier),
            "line-taxi" => ToolbarCommand::Line(LineType::Taxi),
            "line-straight" => ToolbarCommand::Line(LineType::Straight),
            other => return Err(format!("unknown toolbar command: {other}")),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddNode {
        id: String,
        position: Option<Position>,
        shape: Option<String>,
        name: Option<String>,
    },
    AddEdge {
        id: String,
        source: String,
        target: String,
    },
    Move {
        id: String,
        position: Position,
    },
    Shape {
        id: String,
        shape: String,
    },
    Remove(Vec<String>),
    Select(Vec<String>),
    Line(LineType),
    Toolbar(ToolbarCommand),
}

/// Parse an editor script: one command per line, `#` starts a comment line.
pub fn parse_script(input: &str) -> Result<Vec<Command>, String> {
    let mut commands = Vec::new();
    for (index, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut rest = trimmed;
        let parsed = command.parse_next(&mut rest);
        match parsed {
            Ok(cmd) if rest.trim().is_empty() => commands.push(cmd),
            _ => {
                let context = if trimmed.chars().count() > 40 {
                    format!("{}...", trimmed.chars().take(40).collect::<String>())
                } else {
                    trimmed.to_string()
                };
                return Err(format!("line {}: syntax error: unexpected `{context}`", index + 1));
            }
        }
    }
    Ok(commands)
}

fn command(input: &mut &str) -> winnow::Result<Command> {
    alt((
        add_node,
        add_edge,
        move_node,
        shape,
        remove,
        select,
        line,
        toolbar.map(Command::Toolbar),
    ))
    .parse_next(input)
}

fn identifier<'s>(input: &mut &'s str) -> winnow::Result<&'s str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
    })
    .parse_next(input)
}

fn point(input: &mut &str) -> winnow::Result<Position> {
    let x: f64 = float.parse_next(input)?;
    (space0, ',', space0).void().parse_next(input)?;
    let y: f64 = float.parse_next(input)?;
    Ok(Position::new(x, y))
}

fn quoted(input: &mut &str) -> winnow::Result<String> {
    '"'.parse_next(input)?;
    let text = take_while(0.., |c: char| c != '"').parse_next(input)?;
    '"'.parse_next(input)?;
    Ok(text.to_string())
}

fn id_list(input: &mut &str) -> winnow::Result<Vec<String>> {
    let ids: Vec<&str> = separated(1.., identifier, space1).parse_next(input)?;
    Ok(ids.into_iter().map(str::to_string).collect())
}

fn add_node(input: &mut &str) -> winnow::Result<Command> {
    ("add", space1, "node", space1).void().parse_next(input)?;
    let id = identifier.parse_next(input)?;
    let position = opt(preceded((space1, "at", space1), point)).parse_next(input)?;
    let shape = opt(preceded((space1, "type", space1), identifier)).parse_next(input)?;
    let name = opt(preceded((space1, "name", space1), quoted)).parse_next(input)?;
    Ok(Command::AddNode {
        id: id.to_string(),
        position,
        shape: shape.map(str::to_string),
        name,
    })
}

fn add_edge(input: &mut &str) -> winnow::Result<Command> {
    ("add", space1, "edge", space1).void().parse_next(input)?;
    let id = identifier.parse_next(input)?;
    space1.parse_next(input)?;
    let source = identifier.parse_next(input)?;
    (space1, "->", space1).void().parse_next(input)?;
    let target = identifier.parse_next(input)?;
    Ok(Command::AddEdge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
    })
}

fn move_node(input: &mut &str) -> winnow::Result<Command> {
    ("move", space1).void().parse_next(input)?;
    let id = identifier.parse_next(input)?;
    space1.parse_next(input)?;
    let position = point.parse_next(input)?;
    Ok(Command::Move {
        id: id.to_string(),
        position,
    })
}

fn shape(input: &mut &str) -> winnow::Result<Command> {
    ("shape", space1).void().parse_next(input)?;
    let id = identifier.parse_next(input)?;
    space1.parse_next(input)?;
    let shape = identifier.parse_next(input)?;
    Ok(Command::Shape {
        id: id.to_string(),
        shape: shape.to_string(),
    })
}

fn remove(input: &mut &str) -> winnow::Result<Command> {
    ("remove", space1).void().parse_next(input)?;
    id_list.map(Command::Remove).parse_next(input)
}

fn select(input: &mut &str) -> winnow::Result<Command> {
    ("select", space1).void().parse_next(input)?;
    id_list.map(Command::Select).parse_next(input)
}

fn line(input: &mut &str) -> winnow::Result<Command> {
    ("line", space1).void().parse_next(input)?;
    alt((
        "bezier".value(LineType::Bezier),
        "taxi".value(LineType::Taxi),
        "straight".value(LineType::Straight),
    ))
    .map(Command::Line)
    .parse_next(input)
}

fn toolbar(input: &mut &str) -> winnow::Result<ToolbarCommand> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-')
        .verify_map(|name: &str| name.parse().ok())
        .parse_next(input)
}
