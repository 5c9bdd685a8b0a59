use crate::application::outcome::OutcomeEngine;
use crate::application::referral::ReferralAccumulator;
use crate::domain::deposit::{GameResult, SettledPayment, SettlementFinal};
use crate::domain::events::DomainEvent;
use crate::domain::jobs::{SettlementJob, WithdrawalJob};
use crate::domain::money::quantize;
use crate::domain::ports::{
    DepositStoreRef, EventSinkRef, JobQueueRef, SettingsStoreRef, UserDirectoryRef,
};
use crate::domain::user::UserProfile;
use crate::domain::withdrawal::source_id;
use crate::error::Result;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Consumes settlement jobs: claims the order, evaluates the outcome,
/// finalizes the record, and fires the downstream effects.
///
/// The queue delivers at least once, so every step tolerates a replay:
/// the pre-check discards most duplicates cheaply and the store's
/// uniqueness constraint catches the rest.
pub struct SettlementWorker {
    deposits: DepositStoreRef,
    users: UserDirectoryRef,
    engine: Arc<OutcomeEngine>,
    referrals: Arc<ReferralAccumulator>,
    events: EventSinkRef,
    withdrawals: JobQueueRef<WithdrawalJob>,
    settings: SettingsStoreRef,
}

impl SettlementWorker {
    pub fn new(
        deposits: DepositStoreRef,
        users: UserDirectoryRef,
        engine: Arc<OutcomeEngine>,
        referrals: Arc<ReferralAccumulator>,
        events: EventSinkRef,
        withdrawals: JobQueueRef<WithdrawalJob>,
        settings: SettingsStoreRef,
    ) -> Self {
        Self {
            deposits,
            users,
            engine,
            referrals,
            events,
            withdrawals,
            settings,
        }
    }

    /// Settles one job. `Ok` covers both "settled" and
    /// "discarded as duplicate"; `Err` lets the queue's redelivery
    /// policy decide what happens next.
    pub async fn process(&self, job: SettlementJob) -> Result<()> {
        let order_id = job.tx.order_id.clone();

        if self.deposits.exists(&order_id).await? {
            debug!(%order_id, "order already settled, discarding");
            return Ok(());
        }

        let mut payment = SettledPayment::pending(
            &order_id,
            job.tx.amount,
            &job.tx.currency,
            &job.tx.tx_id,
            job.variant,
        );
        payment.counterparty = job.tx.counterparty.clone();
        payment.payer_handle = job.tx.payer_handle.clone();

        // No payer identity at all: settle VOID, no side effects.
        let Some(handle) = job.tx.payer_handle.as_deref() else {
            return self.insert_void(payment, "no payer identity").await;
        };

        let user = self.users.find_by_payer(handle).await?;
        let Some(user) = user else {
            return self.insert_void(payment, "payer not matched to a user").await;
        };
        payment.user_id = Some(user.id.clone());
        if user.payout_address.is_none() {
            return self
                .insert_void(payment, "user has no withdrawal destination")
                .await;
        }

        // Claim the order before evaluating; the second of two racing
        // workers dies here with a Conflict, not after applying effects.
        if let Err(error) = self.deposits.insert(payment).await {
            if error.is_conflict() {
                debug!(%order_id, "lost insert race, already settled");
                return Ok(());
            }
            return Err(error);
        }

        let outcome = self
            .engine
            .evaluate(job.variant, job.tx.amount, &job.tx.tx_id)
            .await?;
        self.deposits
            .finalize(
                &order_id,
                SettlementFinal {
                    result: outcome.result,
                    payout: outcome.payout,
                    metadata: outcome.metadata,
                },
            )
            .await?;
        info!(
            %order_id,
            variant = %job.variant,
            result = ?outcome.result,
            payout = %outcome.payout,
            "payment settled"
        );

        self.apply_side_effects(&job, &user, outcome.result, outcome.payout)
            .await;
        Ok(())
    }

    async fn insert_void(&self, payment: SettledPayment, reason: &str) -> Result<()> {
        let order_id = payment.order_id.clone();
        let mut payment = payment;
        payment.metadata = Some(serde_json::json!({ "void_reason": reason }));
        payment.finalized_at = Some(Utc::now());
        match self.deposits.insert(payment).await {
            Ok(()) => {
                info!(%order_id, reason, "payment settled void");
                Ok(())
            }
            Err(error) if error.is_conflict() => {
                debug!(%order_id, "lost insert race, already settled");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Referral accrual and notifications are best-effort: failures are
    /// logged and swallowed so they can never fail a settled payment.
    /// The withdrawal enqueue is the exception: losing it loses a
    /// payout, so its failure is logged at error level.
    async fn apply_side_effects(
        &self,
        job: &SettlementJob,
        user: &UserProfile,
        result: GameResult,
        payout: Decimal,
    ) {
        let now = Utc::now();

        if let Some(parent_id) = &user.referrer_id {
            let rate = self.settings.get_decimal("referral.rate", dec!(0.01)).await;
            let contribution = quantize(job.tx.amount * rate);
            if let Err(error) = self
                .referrals
                .accrue(&user.id, parent_id, contribution, now)
                .await
            {
                warn!(order_id = %job.tx.order_id, %error, "referral accrual failed");
            }
            self.events
                .emit(DomainEvent::ReferralContribution {
                    child_user_id: user.id.clone(),
                    parent_user_id: parent_id.clone(),
                    amount: contribution,
                    variant: job.variant,
                    result,
                    at: now,
                })
                .await;
        }

        if user.notify_channel.is_some() {
            self.events
                .emit(DomainEvent::SettlementRecorded {
                    order_id: job.tx.order_id.clone(),
                    user_id: Some(user.id.clone()),
                    variant: job.variant,
                    result,
                    payout,
                    at: now,
                })
                .await;
        }

        if result == GameResult::Win {
            let withdrawal = WithdrawalJob {
                user_id: user.id.clone(),
                payout,
                source_id: source_id(job.variant, &job.tx.order_id),
            };
            if let Err(error) = self.withdrawals.enqueue(withdrawal).await {
                error!(order_id = %job.tx.order_id, %error, "failed to enqueue withdrawal");
            }
        }
    }

    /// Consumer loop. Jobs are gone from the queue once received,
    /// matching the no-retention contract; failures are logged here.
    pub async fn run(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<SettlementJob>) {
        while let Some(job) = rx.recv().await {
            let order_id = job.tx.order_id.clone();
            if let Err(error) = self.process(job).await {
                error!(%order_id, %error, "settlement job failed");
            }
        }
    }

    /// Processes everything currently in the queue, then returns. Used
    /// by the bounded simulation rounds.
    pub async fn drain(&self, rx: &mut mpsc::UnboundedReceiver<SettlementJob>) {
        while let Ok(job) = rx.try_recv() {
            let order_id = job.tx.order_id.clone();
            if let Err(error) = self.process(job).await {
                error!(%order_id, %error, "settlement job failed");
            }
        }
    }
}
