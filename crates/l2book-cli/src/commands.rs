//! JSON-lines command protocol.
//!
//! One [`Command`] per input line, one [`Response`] per output line.
//!
//! ```text
//! {"cmd":"submit","side":"Ask","order_type":"Limit","price":"10","volume":"5"}
//! {"cmd":"depth","side":"Bid","levels":5}
//! {"cmd":"orders","side":"Ask"}
//! {"cmd":"trades","since":3}
//! {"cmd":"snapshot"}
//! {"cmd":"digest"}
//! {"cmd":"verify","digest":"9f86d0...15d6"}
//! ```

use l2book_engine::{BookSnapshot, SharedEngine};
use l2book_matchcore::DepthLevel;
use l2book_types::{
    L2BookError, Order, OrderRequest, Result, Side, SubmissionResult, Trade, constants,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Submit(OrderRequest),
    Depth {
        side: Side,
        /// Best levels to return; `DEFAULT_DEPTH_LEVELS` when absent.
        #[serde(default)]
        levels: Option<usize>,
    },
    Orders {
        side: Side,
    },
    Trades {
        /// Only trades with a sequence after this one.
        #[serde(default)]
        since: Option<u64>,
    },
    Snapshot,
    Digest,
    /// Compare the ledger against a previously reported digest.
    Verify {
        digest: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Response {
    Submission(SubmissionResult),
    Depth {
        side: Side,
        levels: Vec<DepthLevel>,
    },
    Orders {
        side: Side,
        orders: Vec<Order>,
    },
    Trades {
        trades: Vec<Trade>,
    },
    Snapshot(BookSnapshot),
    Digest {
        digest: String,
        trade_count: usize,
        best_bid: Option<Decimal>,
        best_ask: Option<Decimal>,
    },
    Verified {
        matches: bool,
        trade_count: usize,
    },
    Error {
        code: u16,
        message: String,
    },
}

impl From<L2BookError> for Response {
    fn from(err: L2BookError) -> Self {
        Self::Error {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

pub fn execute(engine: &SharedEngine, command: Command) -> Result<Response> {
    let response = match command {
        Command::Submit(request) => Response::Submission(engine.submit_order(request)?),
        Command::Depth { side, levels } => {
            let mut ladder = engine.book_depth(side);
            ladder.truncate(levels.unwrap_or(constants::DEFAULT_DEPTH_LEVELS));
            Response::Depth {
                side,
                levels: ladder,
            }
        }
        Command::Orders { side } => Response::Orders {
            side,
            orders: engine.resting_orders(side),
        },
        Command::Trades { since } => Response::Trades {
            trades: match since {
                Some(seq) => engine.trades_since(seq),
                None => engine.trades(),
            },
        },
        Command::Snapshot => Response::Snapshot(engine.snapshot()),
        Command::Digest => engine.read(|e| Response::Digest {
            digest: e.ledger_digest(),
            trade_count: e.ledger().len(),
            best_bid: e.best_bid(),
            best_ask: e.best_ask(),
        }),
        Command::Verify { digest } => engine.read(|e| {
            e.verify_ledger_digest(&digest).map(|matches| Response::Verified {
                matches,
                trade_count: e.ledger().len(),
            })
        })?,
    };
    Ok(response)
}

/// Parse and execute one input line. Failures become [`Response::Error`].
pub fn process_line(engine: &SharedEngine, line: &str) -> Response {
    let command: Command = match serde_json::from_str(line) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!(error = %e, "Malformed command");
            return L2BookError::from(e).into();
        }
    };
    tracing::debug!(?command, "Executing command");
    execute(engine, command).unwrap_or_else(Response::from)
}

#[cfg(test)]
mod tests {
    use l2book_types::*;
    use rust_decimal::Decimal;

    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn parses_every_command() {
        let submit: Command = serde_json::from_str(
            r#"{"cmd":"submit","side":"Bid","order_type":"Limit","price":"10.5","volume":"2"}"#,
        )
        .unwrap();
        assert_eq!(
            submit,
            Command::Submit(OrderRequest::limit(Side::Bid, Decimal::new(105, 1), dec(2)))
        );

        let market: Command =
            serde_json::from_str(r#"{"cmd":"submit","side":"Ask","order_type":"Market","volume":"3"}"#)
                .unwrap();
        assert_eq!(market, Command::Submit(OrderRequest::market(Side::Ask, dec(3))));

        let depth: Command = serde_json::from_str(r#"{"cmd":"depth","side":"Ask"}"#).unwrap();
        assert_eq!(depth, Command::Depth { side: Side::Ask, levels: None });

        let trades: Command = serde_json::from_str(r#"{"cmd":"trades"}"#).unwrap();
        assert_eq!(trades, Command::Trades { since: None });

        let snapshot: Command = serde_json::from_str(r#"{"cmd":"snapshot"}"#).unwrap();
        assert_eq!(snapshot, Command::Snapshot);
    }

    #[test]
    fn submit_then_query() {
        let engine = SharedEngine::default();
        execute(&engine, Command::Submit(OrderRequest::limit(Side::Ask, dec(10), dec(5)))).unwrap();
        execute(&engine, Command::Submit(OrderRequest::limit(Side::Ask, dec(11), dec(1)))).unwrap();

        let depth = execute(&engine, Command::Depth { side: Side::Ask, levels: Some(1) }).unwrap();
        match depth {
            Response::Depth { levels, .. } => {
                assert_eq!(levels.len(), 1);
                assert_eq!(levels[0].price, dec(10));
            }
            other => panic!("unexpected response {other:?}"),
        }

        let fill = execute(&engine, Command::Submit(OrderRequest::market(Side::Bid, dec(2)))).unwrap();
        match fill {
            Response::Submission(result) => assert_eq!(result.outcome, SubmissionOutcome::Filled),
            other => panic!("unexpected response {other:?}"),
        }

        match execute(&engine, Command::Trades { since: None }).unwrap() {
            Response::Trades { trades } => assert_eq!(trades.len(), 1),
            other => panic!("unexpected response {other:?}"),
        }
        match execute(&engine, Command::Trades { since: Some(0) }).unwrap() {
            Response::Trades { trades } => assert!(trades.is_empty()),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn verify_checks_reported_digest() {
        let engine = SharedEngine::default();
        execute(&engine, Command::Submit(OrderRequest::limit(Side::Ask, dec(10), dec(1)))).unwrap();
        execute(&engine, Command::Submit(OrderRequest::market(Side::Bid, dec(1)))).unwrap();

        let digest = match process_line(&engine, r#"{"cmd":"digest"}"#) {
            Response::Digest { digest, .. } => digest,
            other => panic!("unexpected response {other:?}"),
        };
        let line = format!(r#"{{"cmd":"verify","digest":"{digest}"}}"#);
        assert_eq!(
            process_line(&engine, &line),
            Response::Verified { matches: true, trade_count: 1 }
        );

        execute(&engine, Command::Submit(OrderRequest::limit(Side::Ask, dec(10), dec(1)))).unwrap();
        execute(&engine, Command::Submit(OrderRequest::market(Side::Bid, dec(1)))).unwrap();
        assert_eq!(
            process_line(&engine, &line),
            Response::Verified { matches: false, trade_count: 2 }
        );

        match process_line(&engine, r#"{"cmd":"verify","digest":"zz"}"#) {
            Response::Error { code, .. } => assert_eq!(code, 901),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn malformed_line_becomes_error_response() {
        let engine = SharedEngine::default();
        match process_line(&engine, "{not json") {
            Response::Error { code, .. } => assert_eq!(code, 901),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn rejected_order_becomes_error_response() {
        let engine = SharedEngine::default();
        let line = r#"{"cmd":"submit","side":"Bid","order_type":"Limit","price":"10","volume":"0"}"#;
        match process_line(&engine, line) {
            Response::Error { code, message } => {
                assert_eq!(code, 100);
                assert!(message.starts_with("LB_ERR_100"));
            }
            other => panic!("unexpected response {other:?}"),
        }
        assert!(engine.snapshot().bids.is_empty());
    }

    #[test]
    fn responses_are_tagged_json() {
        let engine = SharedEngine::default();
        let response = process_line(&engine, r#"{"cmd":"digest"}"#);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "digest");
        assert_eq!(json["trade_count"], 0);
        assert_eq!(json["digest"].as_str().unwrap().len(), 64);
    }
}
