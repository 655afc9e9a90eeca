//! Command-language parser: one line in, one [`Command`] out.
//!
//! The language is word-oriented: keywords are case-insensitive, names are
//! case-sensitive, commas separate list items, and the assignment form is
//! recognized by an `=` in the second position.

mod ast;

pub use ast::*;

use common::{DbError, DbResult, IndexStrategy, SortDirection};

/// Parse one command line into the AST.
pub fn parse_command(line: &str) -> DbResult<Command> {
    let tokens = tokenize(line);
    let Some(first) = tokens.first() else {
        return Err(DbError::Parse("empty command".into()));
    };
    if tokens.len() >= 2 && tokens[1] == "=" {
        return parse_assignment(&tokens);
    }
    match first.to_ascii_uppercase().as_str() {
        "LOAD" => parse_load(&tokens),
        "LIST" => parse_list(&tokens),
        "PRINT" => single_name(&tokens).map(|name| Command::Print { name }),
        "RENAME" => parse_rename(&tokens),
        "EXPORT" => single_name(&tokens).map(|name| Command::Export { name }),
        "CLEAR" => single_name(&tokens).map(|name| Command::Clear { name }),
        "INDEX" => parse_index(&tokens),
        "SORT" => parse_sort(&tokens),
        "SYMMETRY" => single_name(&tokens).map(|matrix| Command::Symmetry { matrix }),
        "TRANSPOSE" => single_name(&tokens).map(|matrix| Command::Transpose { matrix }),
        "SOURCE" => single_name(&tokens).map(|script| Command::Source { script }),
        "QUIT" | "EXIT" => Ok(Command::Quit),
        other => Err(DbError::Parse(format!("unknown command '{other}'"))),
    }
}

/// True for lines a script runner should skip.
pub fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with("--")
}

fn tokenize(line: &str) -> Vec<String> {
    line.replace(',', " , ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn keyword(token: &str) -> String {
    token.to_ascii_uppercase()
}

fn get<'a>(tokens: &'a [String], index: usize, what: &str) -> DbResult<&'a String> {
    tokens
        .get(index)
        .ok_or_else(|| DbError::Parse(format!("expected {what}")))
}

fn expect_keyword(tokens: &[String], index: usize, expected: &str) -> DbResult<()> {
    let token = get(tokens, index, expected)?;
    if keyword(token) != expected {
        return Err(DbError::Parse(format!(
            "expected {expected}, found '{token}'"
        )));
    }
    Ok(())
}

fn expect_end(tokens: &[String], len: usize) -> DbResult<()> {
    if tokens.len() > len {
        return Err(DbError::Parse(format!(
            "unexpected trailing input '{}'",
            tokens[len..].join(" ")
        )));
    }
    Ok(())
}

/// `<CMD> <name>` with an optional MATRIX keyword before the name.
fn single_name(tokens: &[String]) -> DbResult<String> {
    let start = if tokens.len() > 1 && keyword(&tokens[1]) == "MATRIX" {
        2
    } else {
        1
    };
    let name = get(tokens, start, "a name")?.clone();
    expect_end(tokens, start + 1)?;
    Ok(name)
}

fn parse_load(tokens: &[String]) -> DbResult<Command> {
    if tokens.len() > 1 && keyword(&tokens[1]) == "MATRIX" {
        let name = get(tokens, 2, "a matrix name")?.clone();
        expect_end(tokens, 3)?;
        Ok(Command::Load {
            name,
            kind: ObjectKind::Matrix,
        })
    } else {
        let name = get(tokens, 1, "a table name")?.clone();
        expect_end(tokens, 2)?;
        Ok(Command::Load {
            name,
            kind: ObjectKind::Table,
        })
    }
}

fn parse_list(tokens: &[String]) -> DbResult<Command> {
    let what = get(tokens, 1, "TABLES or MATRICES")?;
    expect_end(tokens, 2)?;
    match keyword(what).as_str() {
        "TABLES" => Ok(Command::List {
            kind: ObjectKind::Table,
        }),
        "MATRICES" => Ok(Command::List {
            kind: ObjectKind::Matrix,
        }),
        other => Err(DbError::Parse(format!(
            "LIST expects TABLES or MATRICES, found '{other}'"
        ))),
    }
}

fn parse_rename(tokens: &[String]) -> DbResult<Command> {
    let start = if tokens.len() > 1 && keyword(&tokens[1]) == "MATRIX" {
        2
    } else {
        1
    };
    let old = get(tokens, start, "the current name")?.clone();
    let new = get(tokens, start + 1, "the new name")?.clone();
    expect_end(tokens, start + 2)?;
    Ok(Command::Rename { old, new })
}

fn parse_index(tokens: &[String]) -> DbResult<Command> {
    expect_keyword(tokens, 1, "ON")?;
    let column = get(tokens, 2, "a column name")?.clone();
    expect_keyword(tokens, 3, "FROM")?;
    let table = get(tokens, 4, "a table name")?.clone();
    expect_keyword(tokens, 5, "USING")?;
    let strategy = match keyword(get(tokens, 6, "BTREE, HASH or NOTHING")?).as_str() {
        "BTREE" => Some(IndexStrategy::BTree),
        "HASH" => Some(IndexStrategy::Hash),
        "NOTHING" => None,
        other => {
            return Err(DbError::Parse(format!(
                "INDEX expects BTREE, HASH or NOTHING, found '{other}'"
            )));
        }
    };
    expect_end(tokens, 7)?;
    Ok(Command::Index {
        table,
        column,
        strategy,
    })
}

fn parse_sort(tokens: &[String]) -> DbResult<Command> {
    let table = get(tokens, 1, "a table name")?.clone();
    expect_keyword(tokens, 2, "BY")?;

    let mut columns = Vec::new();
    let mut cursor = 3;
    while cursor < tokens.len() && keyword(&tokens[cursor]) != "IN" {
        if tokens[cursor] != "," {
            columns.push(tokens[cursor].clone());
        }
        cursor += 1;
    }
    expect_keyword(tokens, cursor, "IN")?;

    let mut directions = Vec::new();
    for token in &tokens[cursor + 1..] {
        if token == "," {
            continue;
        }
        directions.push(parse_direction(token)?);
    }

    if columns.is_empty() {
        return Err(DbError::Parse("SORT needs at least one column".into()));
    }
    if columns.len() != directions.len() {
        return Err(DbError::Parse(format!(
            "SORT has {} columns but {} directions",
            columns.len(),
            directions.len()
        )));
    }
    Ok(Command::Sort {
        table,
        columns,
        directions,
    })
}

fn parse_assignment(tokens: &[String]) -> DbResult<Command> {
    let target = tokens[0].clone();
    let op = get(tokens, 2, "an operation")?;
    let operation = match keyword(op).as_str() {
        "SELECT" => parse_select(tokens)?,
        "PROJECT" => parse_project(tokens)?,
        "JOIN" => parse_join(tokens)?,
        "CROSS" => parse_cross(tokens)?,
        "DISTINCT" => Operation::Distinct {
            table: {
                let table = get(tokens, 3, "a table name")?.clone();
                expect_end(tokens, 4)?;
                table
            },
        },
        "GROUPBY" => parse_groupby(tokens)?,
        "ORDERBY" => parse_orderby(tokens)?,
        "COMPUTE" => Operation::Compute {
            matrix: {
                let matrix = get(tokens, 3, "a matrix name")?.clone();
                expect_end(tokens, 4)?;
                matrix
            },
        },
        other => {
            return Err(DbError::Parse(format!(
                "unknown assignment operation '{other}'"
            )));
        }
    };
    Ok(Command::Assign { target, operation })
}

fn parse_select(tokens: &[String]) -> DbResult<Operation> {
    let column = get(tokens, 3, "a column name")?.clone();
    let op = parse_binop(get(tokens, 4, "a comparison operator")?)?;
    let rhs_token = get(tokens, 5, "a literal or column")?;
    let rhs = match rhs_token.parse::<common::Cell>() {
        Ok(value) => SelectRhs::Literal(value),
        Err(_) => SelectRhs::Column(rhs_token.clone()),
    };
    expect_keyword(tokens, 6, "FROM")?;
    let table = get(tokens, 7, "a table name")?.clone();
    expect_end(tokens, 8)?;
    Ok(Operation::Select {
        column,
        op,
        rhs,
        table,
    })
}

fn parse_project(tokens: &[String]) -> DbResult<Operation> {
    let mut columns = Vec::new();
    let mut cursor = 3;
    while cursor < tokens.len() && keyword(&tokens[cursor]) != "FROM" {
        if tokens[cursor] != "," {
            columns.push(tokens[cursor].clone());
        }
        cursor += 1;
    }
    if columns.is_empty() {
        return Err(DbError::Parse("PROJECT needs at least one column".into()));
    }
    expect_keyword(tokens, cursor, "FROM")?;
    let table = get(tokens, cursor + 1, "a table name")?.clone();
    expect_end(tokens, cursor + 2)?;
    Ok(Operation::Project { columns, table })
}

fn parse_join(tokens: &[String]) -> DbResult<Operation> {
    let left = get(tokens, 3, "a table name")?.clone();
    let mut cursor = 4;
    if tokens.get(cursor).is_some_and(|t| t == ",") {
        cursor += 1;
    }
    let right = get(tokens, cursor, "a table name")?.clone();
    expect_keyword(tokens, cursor + 1, "ON")?;
    let left_column = get(tokens, cursor + 2, "a column name")?.clone();
    let op = parse_binop(get(tokens, cursor + 3, "a comparison operator")?)?;
    let right_column = get(tokens, cursor + 4, "a column name")?.clone();
    expect_end(tokens, cursor + 5)?;
    Ok(Operation::Join {
        left,
        right,
        left_column,
        op,
        right_column,
    })
}

fn parse_cross(tokens: &[String]) -> DbResult<Operation> {
    let left = get(tokens, 3, "a table name")?.clone();
    let mut cursor = 4;
    if tokens.get(cursor).is_some_and(|t| t == ",") {
        cursor += 1;
    }
    let right = get(tokens, cursor, "a table name")?.clone();
    expect_end(tokens, cursor + 1)?;
    Ok(Operation::Cross { left, right })
}

fn parse_groupby(tokens: &[String]) -> DbResult<Operation> {
    let group_column = get(tokens, 3, "a column name")?.clone();
    expect_keyword(tokens, 4, "FROM")?;
    let table = get(tokens, 5, "a table name")?.clone();
    expect_keyword(tokens, 6, "RETURN")?;
    let aggregate = parse_aggregate(get(tokens, 7, "an aggregate")?)?;
    let agg_column = get(tokens, 8, "a column name")?.clone();
    expect_end(tokens, 9)?;
    Ok(Operation::GroupBy {
        group_column,
        table,
        aggregate,
        agg_column,
    })
}

fn parse_orderby(tokens: &[String]) -> DbResult<Operation> {
    let column = get(tokens, 3, "a column name")?.clone();
    let direction = parse_direction(get(tokens, 4, "ASC or DESC")?)?;
    expect_keyword(tokens, 5, "ON")?;
    let table = get(tokens, 6, "a table name")?.clone();
    expect_end(tokens, 7)?;
    Ok(Operation::OrderBy {
        column,
        direction,
        table,
    })
}

fn parse_binop(token: &str) -> DbResult<BinOp> {
    match token {
        "==" => Ok(BinOp::Eq),
        "!=" => Ok(BinOp::Ne),
        "<" => Ok(BinOp::Lt),
        "<=" => Ok(BinOp::Le),
        ">" => Ok(BinOp::Gt),
        ">=" => Ok(BinOp::Ge),
        other => Err(DbError::Parse(format!(
            "unknown comparison operator '{other}'"
        ))),
    }
}

fn parse_direction(token: &str) -> DbResult<SortDirection> {
    match keyword(token).as_str() {
        "ASC" => Ok(SortDirection::Asc),
        "DESC" => Ok(SortDirection::Desc),
        other => Err(DbError::Parse(format!(
            "expected ASC or DESC, found '{other}'"
        ))),
    }
}

fn parse_aggregate(token: &str) -> DbResult<Aggregate> {
    match keyword(token).as_str() {
        "MAX" => Ok(Aggregate::Max),
        "MIN" => Ok(Aggregate::Min),
        "SUM" => Ok(Aggregate::Sum),
        "AVG" => Ok(Aggregate::Avg),
        "COUNT" => Ok(Aggregate::Count),
        other => Err(DbError::Parse(format!("unknown aggregate '{other}'"))),
    }
}
