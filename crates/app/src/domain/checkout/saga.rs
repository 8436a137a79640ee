//! Per-line checkout state.
//!
//! Each cart line is one compensable step. Lines move
//! `Pending -> Committed`, and on a later failure
//! `Committed -> Compensated | CompensationFailed`.

use smallvec::SmallVec;

use crate::domain::{carts::models::CartLine, sales::models::Sale};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineState {
    Pending,
    Committed(Sale),
    Compensated(Sale),
    CompensationFailed(Sale),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaLine {
    pub line: CartLine,
    pub state: LineState,
}

#[derive(Debug, Clone, Default)]
pub struct Saga {
    lines: SmallVec<[SagaLine; 8]>,
}

impl Saga {
    #[must_use]
    pub fn new(lines: &[CartLine]) -> Self {
        Self {
            lines: lines
                .iter()
                .map(|line| SagaLine {
                    line: *line,
                    state: LineState::Pending,
                })
                .collect(),
        }
    }

    pub fn lines(&self) -> &[SagaLine] {
        &self.lines
    }

    /// Record the sale created for step `index`.
    pub fn commit(&mut self, index: usize, sale: Sale) {
        if let Some(step) = self.lines.get_mut(index) {
            step.state = LineState::Committed(sale);
        }
    }

    /// Committed sales, most recent first: the order to undo them in.
    pub fn to_compensate(&self) -> Vec<(usize, Sale)> {
        self.lines
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(index, step)| match &step.state {
                LineState::Committed(sale) => Some((index, sale.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn compensated(&mut self, index: usize, succeeded: bool) {
        if let Some(step) = self.lines.get_mut(index) {
            let state = std::mem::replace(&mut step.state, LineState::Pending);

            step.state = match state {
                LineState::Committed(sale) if succeeded => LineState::Compensated(sale),
                LineState::Committed(sale) => LineState::CompensationFailed(sale),
                other => other,
            };
        }
    }

    /// Every step committed.
    pub fn is_complete(&self) -> bool {
        self.lines
            .iter()
            .all(|step| matches!(step.state, LineState::Committed(_)))
    }

    /// Consume a complete saga into its sales, in cart order.
    pub fn into_sales(self) -> Vec<Sale> {
        self.lines
            .into_iter()
            .filter_map(|step| match step.state {
                LineState::Committed(sale) => Some(sale),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&LineState) -> bool) -> usize {
        self.lines.iter().filter(|step| predicate(&step.state)).count()
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use crate::{
        customers::CustomerId,
        domain::{items::models::ItemUuid, sales::models::SaleUuid},
    };

    use super::*;

    fn line(quantity: u32) -> CartLine {
        CartLine {
            item: ItemUuid::new(),
            quantity,
        }
    }

    fn sale(line: &CartLine) -> Sale {
        Sale {
            uuid: SaleUuid::new(),
            item: line.item,
            customer_id: CustomerId::new(1),
            quantity: line.quantity,
            total_price: 0,
            sold_at: Timestamp::now(),
        }
    }

    #[test]
    fn compensation_runs_newest_first() {
        let lines = [line(1), line(2), line(3)];
        let mut saga = Saga::new(&lines);

        let first = sale(&lines[0]);
        let second = sale(&lines[1]);

        saga.commit(0, first.clone());
        saga.commit(1, second.clone());

        assert!(!saga.is_complete());
        assert_eq!(saga.to_compensate(), vec![(1, second), (0, first)]);
    }

    #[test]
    fn compensation_outcomes_are_recorded() {
        let lines = [line(1), line(2)];
        let mut saga = Saga::new(&lines);

        saga.commit(0, sale(&lines[0]));
        saga.commit(1, sale(&lines[1]));

        saga.compensated(1, true);
        saga.compensated(0, false);

        assert!(matches!(saga.lines()[1].state, LineState::Compensated(_)));
        assert!(matches!(
            saga.lines()[0].state,
            LineState::CompensationFailed(_)
        ));
        assert!(saga.to_compensate().is_empty());
    }

    #[test]
    fn pending_lines_are_never_compensated() {
        let lines = [line(1)];
        let mut saga = Saga::new(&lines);

        saga.compensated(0, true);

        assert_eq!(saga.lines()[0].state, LineState::Pending);
    }

    #[test]
    fn complete_saga_yields_sales_in_cart_order() {
        let lines = [line(1), line(2)];
        let mut saga = Saga::new(&lines);

        let first = sale(&lines[0]);
        let second = sale(&lines[1]);

        saga.commit(1, second.clone());
        saga.commit(0, first.clone());

        assert!(saga.is_complete());
        assert_eq!(saga.into_sales(), vec![first, second]);
    }
}
