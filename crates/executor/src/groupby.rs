use crate::{register_table, result_table, CommandOutput, Engine};
use ahash::RandomState;
use buffer::Cursor;
use common::{Cell, DbResult};
use hashbrown::HashMap;
use parser::Aggregate;
use table::BlockWriter;

/// Running aggregate state for one group.
#[derive(Clone, Copy, Debug, Default)]
struct GroupState {
    sum: i64,
    count: i64,
    min: Cell,
    max: Cell,
}

impl GroupState {
    fn fold(&mut self, value: Cell) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.sum += i64::from(value);
        self.count += 1;
    }

    fn finish(&self, aggregate: Aggregate) -> Cell {
        match aggregate {
            Aggregate::Max => self.max,
            Aggregate::Min => self.min,
            Aggregate::Sum => self.sum as Cell,
            Aggregate::Avg => (self.sum / self.count) as Cell,
            Aggregate::Count => self.count as Cell,
        }
    }
}

fn aggregate_label(aggregate: Aggregate, column: &str) -> String {
    let prefix = match aggregate {
        Aggregate::Max => "MAX",
        Aggregate::Min => "MIN",
        Aggregate::Sum => "SUM",
        Aggregate::Avg => "AVG",
        Aggregate::Count => "COUNT",
    };
    format!("{prefix}{column}")
}

/// `NEW = GROUPBY g FROM t RETURN AGG a`: hash aggregation over one pass,
/// output ordered by group key.
pub(crate) fn run(
    engine: &mut Engine,
    target: &str,
    group_column: &str,
    table_name: &str,
    aggregate: Aggregate,
    agg_column: &str,
) -> DbResult<CommandOutput> {
    let src = engine.catalog.table(table_name)?.clone();
    let group_ordinal = src.require_column(group_column)?;
    let agg_ordinal = src.require_column(agg_column)?;

    let mut groups: HashMap<Cell, GroupState, RandomState> = HashMap::default();
    let mut cursor = Cursor::new(&src.name, src.block_count);
    while let Some(row) = cursor.next_row(&mut engine.pool)? {
        groups
            .entry(row[group_ordinal])
            .or_default()
            .fold(row[agg_ordinal]);
    }

    let columns = vec![
        group_column.to_string(),
        aggregate_label(aggregate, agg_column),
    ];
    let mut writer = BlockWriter::new(result_table(engine, target, columns)?);

    let mut keys: Vec<Cell> = groups.keys().copied().collect();
    keys.sort_unstable();
    for key in keys {
        let state = groups[&key];
        writer.push(vec![key, state.finish(aggregate)], &mut engine.pool)?;
    }

    let meta = writer.finish(&mut engine.pool)?;
    register_table(engine, meta)
}
