//! Scripted build orders given on the command line as `kind@column,row`.

use std::str::FromStr;

use endless_defence_core::{CellCoord, TowerKind};

/// A tower to place on the active field before the run starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BuildOrder {
    pub(crate) kind: TowerKind,
    pub(crate) cell: CellCoord,
}

impl FromStr for BuildOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, cell) = value
            .split_once('@')
            .ok_or_else(|| format!("expected kind@column,row, got '{value}'"))?;
        let kind = kind.trim().parse::<TowerKind>().map_err(|error| error.to_string())?;
        let (column, row) = cell
            .split_once(',')
            .ok_or_else(|| format!("expected column,row, got '{cell}'"))?;
        let column = column
            .trim()
            .parse::<u32>()
            .map_err(|error| format!("bad column '{column}': {error}"))?;
        let row = row
            .trim()
            .parse::<u32>()
            .map_err(|error| format!("bad row '{row}': {error}"))?;

        Ok(Self {
            kind,
            cell: CellCoord::new(column, row),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_cell() {
        assert_eq!(
            "sniper@4,2".parse::<BuildOrder>(),
            Ok(BuildOrder {
                kind: TowerKind::Sniper,
                cell: CellCoord::new(4, 2),
            })
        );
        assert_eq!(
            " blaster @ 10, 7".parse::<BuildOrder>().map(|order| order.cell),
            Ok(CellCoord::new(10, 7))
        );
    }

    #[test]
    fn rejects_malformed_orders() {
        assert!("gunner".parse::<BuildOrder>().is_err());
        assert!("cannon@1,1".parse::<BuildOrder>().is_err());
        assert!("gunner@1".parse::<BuildOrder>().is_err());
        assert!("gunner@-1,2".parse::<BuildOrder>().is_err());
    }
}
