//! Periodic speech-reminder sweep.
//!
//! A cron job loads every pending reminder, asks the escalation engine which
//! thresholds were crossed since the last sweep, posts one nudge per crossed
//! level, and bumps the stored level only for nudges that were delivered.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use teloxide::{prelude::*, types::ChatId};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::connection::DatabaseManager;
use crate::database::models::SpeechReminder;
use crate::database::store;
use crate::engine::reminder::{sweep, Escalation};
use crate::utils::markdown::escape_markdown;

pub struct SpeechReminderService {
    bot: Bot,
    db: Arc<DatabaseManager>,
    threshold_days: i64,
    scheduler: JobScheduler,
}

impl SpeechReminderService {
    pub async fn new(
        bot: Bot,
        db: Arc<DatabaseManager>,
        threshold_days: i64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            bot,
            db,
            threshold_days,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bot = self.bot.clone();
        let db = self.db.clone();
        let threshold_days = self.threshold_days;

        // Daily at 9 AM UTC.
        let sweep_job = Job::new_async("0 0 9 * * *", move |_uuid, _l| {
            let bot = bot.clone();
            let db = db.clone();
            Box::pin(async move {
                if let Err(e) = run_sweep(bot, db, threshold_days).await {
                    tracing::error!("Speech reminder sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(sweep_job).await?;
        self.scheduler.start().await?;

        tracing::info!(
            "Speech reminder service started - sweeping daily, escalating every {} days",
            self.threshold_days
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing
    pub async fn sweep_now(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        run_sweep(self.bot.clone(), self.db.clone(), self.threshold_days).await
    }
}

async fn run_sweep(
    bot: Bot,
    db: Arc<DatabaseManager>,
    threshold_days: i64,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // One consistent `now` for the whole sweep.
    let now = Utc::now();
    let pending = SpeechReminder::find_all_pending(&db.pool).await?;
    let escalations = sweep(&pending, now, Duration::days(threshold_days));

    if escalations.is_empty() {
        tracing::debug!("Speech sweep: nothing to escalate");
        return Ok(());
    }

    // Levels per reminder arrive in ascending order; a failed send stops
    // that reminder's run so the stored level never advances past a level
    // that was not actually notified. Skipped levels come back next sweep.
    let mut delivered = Vec::new();
    let mut failed: HashSet<String> = HashSet::new();
    for escalation in escalations {
        if failed.contains(&escalation.reminder_id) {
            continue;
        }
        if send_nudge(&bot, &escalation, threshold_days).await {
            delivered.push(escalation);
        } else {
            failed.insert(escalation.reminder_id.clone());
        }
    }

    store::apply_escalations(&db.pool, &delivered).await?;
    tracing::info!("Speech sweep: {} escalation(s) delivered", delivered.len());
    Ok(())
}

async fn send_nudge(bot: &Bot, escalation: &Escalation, threshold_days: i64) -> bool {
    let urgency = if escalation.level >= 2 { "🚨" } else { "🔔" };
    let message_text = format!(
        "{} *Speech reminder* \\(level {}\\)\n\n👑 {} won gameweek {} and still owes a speech\\!\n⏰ Overdue by {}\\+ days\\.\n\nMark it written with /speechdone {} {}",
        urgency,
        escalation.level,
        escape_markdown(&escalation.winner_name),
        escalation.gameweek,
        escalation.level * threshold_days,
        escape_markdown(&escalation.league_id),
        escalation.gameweek,
    );

    match bot
        .send_message(ChatId(escalation.chat_id), message_text)
        .parse_mode(teloxide::types::ParseMode::MarkdownV2)
        .await
    {
        Ok(_) => true,
        Err(e) => {
            tracing::error!(
                "Failed to send speech nudge to chat {}: {}",
                escalation.chat_id,
                e
            );
            false
        }
    }
}
