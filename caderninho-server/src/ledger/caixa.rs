//! Cash register ("caixa") sessions
//!
//! One session per business date: no row → open → closed. A closed date
//! cannot be reopened. `current_balance = initial + Σ inflows − Σ outflows`,
//! always computed on read.

use rust_decimal::Decimal;
use shared::models::{
    Caixa, CaixaClose, CaixaOpen, CaixaStatus, CaixaSummary, CaixaTransaction,
    CaixaTransactionCreate, TransactionKind,
};

use super::LedgerService;
use super::money::{to_decimal, to_f64, validate_amount, validate_non_negative};
use crate::db::repository::caixa::{self as repo, NewTransaction};
use crate::db::repository::RepoError;
use crate::utils::time::{DATE_FORMAT, business_date_string, parse_date};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, normalize_optional, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Inflow, outflow and resulting balance of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaixaTotals {
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub balance: Decimal,
}

/// Fold transactions over the initial balance
pub fn summarize(initial_balance: f64, transactions: &[CaixaTransaction]) -> CaixaTotals {
    let (inflow, outflow) = transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(inflow, outflow), t| match t.kind {
            TransactionKind::Inflow => (inflow + to_decimal(t.amount), outflow),
            TransactionKind::Outflow => (inflow, outflow + to_decimal(t.amount)),
        },
    );
    CaixaTotals {
        inflow,
        outflow,
        balance: to_decimal(initial_balance) + inflow - outflow,
    }
}

fn status_of(date: String, caixa: Option<Caixa>, transactions: Vec<CaixaTransaction>) -> CaixaStatus {
    match caixa {
        Some(caixa) => {
            let totals = summarize(caixa.initial_balance, &transactions);
            CaixaStatus {
                date,
                is_open: !caixa.is_closed,
                caixa: Some(caixa),
                total_inflow: to_f64(totals.inflow),
                total_outflow: to_f64(totals.outflow),
                current_balance: to_f64(totals.balance),
                transactions,
            }
        }
        None => CaixaStatus {
            date,
            is_open: false,
            caixa: None,
            total_inflow: 0.0,
            total_outflow: 0.0,
            current_balance: 0.0,
            transactions: Vec::new(),
        },
    }
}

fn summary_of(caixa: Caixa, transactions: &[CaixaTransaction]) -> CaixaSummary {
    let totals = summarize(caixa.initial_balance, transactions);
    CaixaSummary {
        caixa,
        total_inflow: to_f64(totals.inflow),
        total_outflow: to_f64(totals.outflow),
        current_balance: to_f64(totals.balance),
        transaction_count: transactions.len(),
    }
}

fn not_open(date: &str) -> AppError {
    AppError::with_message(ErrorCode::CaixaNotOpen, format!("No open caixa for {date}"))
        .with_detail("date", date)
}

fn already_closed(date: &str) -> AppError {
    AppError::with_message(ErrorCode::CaixaAlreadyClosed, format!("Caixa for {date} is already closed"))
        .with_detail("date", date)
}

fn already_open(date: &str) -> AppError {
    AppError::with_message(ErrorCode::CaixaAlreadyOpen, format!("Caixa for {date} is already open"))
        .with_detail("date", date)
}

impl LedgerService {
    /// Business date in the configured time zone
    pub fn today(&self) -> String {
        business_date_string(self.timezone)
    }

    /// Open today's session
    pub async fn open_caixa(&self, data: CaixaOpen, opened_by: i64) -> AppResult<Caixa> {
        validate_non_negative(data.initial_balance, "initial_balance")?;
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        let note = normalize_optional(data.note);
        let date = self.today();

        let _guard = self.lock().await;
        if let Some(existing) = repo::find_by_date(&self.pool, &date).await? {
            return Err(if existing.is_closed {
                already_closed(&date)
            } else {
                already_open(&date)
            });
        }

        let caixa = repo::insert(
            &self.pool,
            &date,
            to_f64(to_decimal(data.initial_balance)),
            opened_by,
            note.as_deref(),
        )
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => already_open(&date),
            other => other.into(),
        })?;

        tracing::info!(caixa_id = caixa.id, date = %date, initial_balance = caixa.initial_balance, "Caixa opened");
        Ok(caixa)
    }

    /// Manual inflow/outflow on today's open session
    ///
    /// Outflows may take the balance below zero.
    pub async fn add_caixa_transaction(
        &self,
        data: CaixaTransactionCreate,
        created_by: i64,
    ) -> AppResult<CaixaTransaction> {
        validate_amount(data.amount, "amount")?;
        validate_required_text(&data.description, "description", MAX_NAME_LEN)?;
        let date = self.today();

        let _guard = self.lock().await;
        let session = repo::find_by_date(&self.pool, &date)
            .await?
            .ok_or_else(|| not_open(&date))?;
        if session.is_closed {
            return Err(already_closed(&date));
        }

        let transaction = repo::insert_transaction(
            &self.pool,
            NewTransaction {
                caixa_id: session.id,
                kind: data.kind,
                amount: to_f64(to_decimal(data.amount)),
                description: data.description.trim(),
                payment_id: None,
                created_by,
            },
        )
        .await?;

        tracing::info!(
            caixa_id = session.id,
            transaction_id = transaction.id,
            kind = ?transaction.kind,
            amount = transaction.amount,
            "Caixa transaction recorded"
        );
        Ok(transaction)
    }

    /// Close today's session, snapshotting the current balance
    pub async fn close_caixa(&self, data: CaixaClose, closed_by: i64) -> AppResult<CaixaSummary> {
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        let note = normalize_optional(data.note);
        let date = self.today();

        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let session = repo::find_by_date(&mut *tx, &date)
            .await?
            .ok_or_else(|| not_open(&date))?;
        if session.is_closed {
            return Err(already_closed(&date));
        }

        let transactions = repo::find_transactions(&mut *tx, session.id).await?;
        let totals = summarize(session.initial_balance, &transactions);

        let closed = repo::close(
            &mut *tx,
            session.id,
            closed_by,
            to_f64(totals.balance),
            note.as_deref(),
        )
        .await?
        .ok_or_else(|| already_closed(&date))?;

        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(
            caixa_id = closed.id,
            date = %date,
            closing_balance = %totals.balance,
            transactions = transactions.len(),
            "Caixa closed"
        );

        Ok(summary_of(closed, &transactions))
    }

    /// Today's session; a missing session reports closed with zero totals
    pub async fn caixa_status(&self) -> AppResult<CaixaStatus> {
        let date = self.today();
        let caixa = repo::find_by_date(&self.pool, &date).await?;
        let transactions = match &caixa {
            Some(c) => repo::find_transactions(&self.pool, c.id).await?,
            None => Vec::new(),
        };
        Ok(status_of(date, caixa, transactions))
    }

    /// Session of a given `YYYY-MM-DD` date
    pub async fn caixa_by_date(&self, date: &str) -> AppResult<CaixaStatus> {
        let date = parse_date(date)?.format(DATE_FORMAT).to_string();
        let caixa = repo::find_by_date(&self.pool, &date).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::CaixaNotFound, format!("No caixa for {date}"))
                .with_detail("date", date.clone())
        })?;
        let transactions = repo::find_transactions(&self.pool, caixa.id).await?;
        Ok(status_of(date, Some(caixa), transactions))
    }

    /// Sessions in an inclusive date range with their totals, newest first
    pub async fn caixa_history(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        limit: i64,
    ) -> AppResult<Vec<CaixaSummary>> {
        let from = from.map(parse_date).transpose()?;
        let to = to.map(parse_date).transpose()?;
        if let (Some(f), Some(t)) = (from, to)
            && f > t
        {
            return Err(AppError::validation(format!("from ({f}) is after to ({t})")));
        }
        let fmt = |d: chrono::NaiveDate| d.format(DATE_FORMAT).to_string();
        let from = from.map(fmt);
        let to = to.map(fmt);

        let sessions = repo::find_range(&self.pool, from.as_deref(), to.as_deref(), limit).await?;
        let ids: Vec<i64> = sessions.iter().map(|c| c.id).collect();
        let mut grouped = repo::find_transactions_for(&self.pool, &ids).await?;

        Ok(sessions
            .into_iter()
            .map(|caixa| {
                let transactions = grouped.remove(&caixa.id).unwrap_or_default();
                summary_of(caixa, &transactions)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn tx(kind: TransactionKind, amount: f64) -> CaixaTransaction {
        CaixaTransaction {
            id: 0,
            caixa_id: 1,
            kind,
            amount,
            description: "x".into(),
            payment_id: None,
            created_by: 1,
            created_at: 0,
        }
    }

    async fn service() -> LedgerService {
        let db = DbService::in_memory().await.unwrap();
        LedgerService::new(db.pool, chrono_tz::America::Sao_Paulo)
    }

    #[test]
    fn summarize_folds_inflows_and_outflows() {
        let totals = summarize(
            100.0,
            &[tx(TransactionKind::Inflow, 20.0), tx(TransactionKind::Outflow, 5.0)],
        );
        assert_eq!(to_f64(totals.inflow), 20.0);
        assert_eq!(to_f64(totals.outflow), 5.0);
        assert_eq!(to_f64(totals.balance), 115.0);

        let empty = summarize(42.5, &[]);
        assert_eq!(to_f64(empty.balance), 42.5);
    }

    #[test]
    fn outflows_may_go_negative() {
        let totals = summarize(10.0, &[tx(TransactionKind::Outflow, 25.0)]);
        assert_eq!(to_f64(totals.balance), -15.0);
    }

    #[tokio::test]
    async fn open_transact_close() {
        let ledger = service().await;

        let status = ledger.caixa_status().await.unwrap();
        assert!(!status.is_open);
        assert!(status.caixa.is_none());

        let err = ledger
            .add_caixa_transaction(
                CaixaTransactionCreate {
                    kind: TransactionKind::Inflow,
                    amount: 1.0,
                    description: "troco".into(),
                },
                1,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CaixaNotOpen);

        ledger
            .open_caixa(
                CaixaOpen {
                    initial_balance: 100.0,
                    note: None,
                },
                1,
            )
            .await
            .unwrap();
        let again = ledger.open_caixa(CaixaOpen::default(), 1).await.unwrap_err();
        assert_eq!(again.code, ErrorCode::CaixaAlreadyOpen);

        for (kind, amount) in [(TransactionKind::Inflow, 20.0), (TransactionKind::Outflow, 5.0)] {
            ledger
                .add_caixa_transaction(
                    CaixaTransactionCreate {
                        kind,
                        amount,
                        description: "movimento".into(),
                    },
                    1,
                )
                .await
                .unwrap();
        }

        let status = ledger.caixa_status().await.unwrap();
        assert!(status.is_open);
        assert_eq!(status.current_balance, 115.0);
        assert_eq!(status.transactions.len(), 2);

        let closed = ledger.close_caixa(CaixaClose::default(), 1).await.unwrap();
        assert!(closed.caixa.is_closed);
        assert_eq!(closed.caixa.closing_balance, Some(115.0));
        assert_eq!(closed.transaction_count, 2);

        let err = ledger.close_caixa(CaixaClose::default(), 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CaixaAlreadyClosed);
        let err = ledger.open_caixa(CaixaOpen::default(), 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CaixaAlreadyClosed);

        let history = ledger.caixa_history(None, None, 30).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].current_balance, 115.0);

        let by_date = ledger.caixa_by_date(&ledger.today()).await.unwrap();
        assert_eq!(by_date.current_balance, 115.0);
        assert!(!by_date.is_open);
    }

    #[tokio::test]
    async fn rejects_bad_input() {
        let ledger = service().await;

        let err = ledger
            .open_caixa(
                CaixaOpen {
                    initial_balance: -1.0,
                    note: None,
                },
                1,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);

        let err = ledger.caixa_by_date("2020-01-01").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CaixaNotFound);
        assert!(ledger.caixa_by_date("01/01/2020").await.is_err());
        assert!(ledger
            .caixa_history(Some("2024-02-01"), Some("2024-01-01"), 30)
            .await
            .is_err());
    }
}
