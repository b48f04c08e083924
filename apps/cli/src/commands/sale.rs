//! # Sale Commands
//!
//! ## Entry Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  args ──► SaleDraft ──► pricing_volume ──► validate_and_price           │
//! │                          (selected period,       │                      │
//! │                           entry excluded)        ▼                      │
//! │                                         into_record / apply_to          │
//! │                                                  │                      │
//! │                                                  ▼                      │
//! │                                       SaleRepository insert / update    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Derived figures are computed once here and never recomputed by reports.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::cli::{AddSaleArgs, EditSaleArgs, NoSaleArgs, PeriodArgs, SaleCommand};
use crate::context::AppContext;
use crate::error::{CliError, CliResult};
use crate::output;
use tally_core::entry::{validate_and_price, DraftOutcome, SaleDraft};
use tally_core::validation::validate_notes;
use tally_core::{CoreError, ManagerName, SaleRecord, SaleType, TourOutcome, TrustPoints};

pub async fn run(ctx: &AppContext, command: SaleCommand) -> CliResult<String> {
    match command {
        SaleCommand::Add(args) => add(ctx, args).await,
        SaleCommand::NoSale(args) => no_sale(ctx, args).await,
        SaleCommand::Edit(args) => edit(ctx, args).await,
        SaleCommand::List(period) => list(ctx, &period).await,
        SaleCommand::Cancel { id } => cancel(ctx, &id).await,
        SaleCommand::Note { id, text } => note(ctx, &id, &text).await,
        SaleCommand::Delete { id } => delete(ctx, &id).await,
    }
}

fn describe(record: &SaleRecord) -> String {
    match &record.outcome {
        TourOutcome::Sale(d) => format!(
            "{} {} {} on {} ({} tours): commission {} = {}, daily VPG {}, FDI cost {}",
            record.id,
            d.client_last_name,
            d.sale_amount.to_grouped_string(),
            record.date.format("%m/%d/%Y"),
            record.tours,
            d.commission_rate,
            d.commission_amount.to_grouped_string(),
            d.daily_vpg.to_grouped_string(),
            d.fdi_cost.to_grouped_string(),
        ),
        TourOutcome::NoSale => format!(
            "{} no sale on {} ({} tours)",
            record.id,
            record.date.format("%m/%d/%Y"),
            record.tours
        ),
    }
}

/// Prices and stores a new entry in the current project.
async fn record(ctx: &AppContext, draft: SaleDraft) -> CliResult<SaleRecord> {
    let project = ctx.project().await?;
    let volume = ctx.pricing_volume(&project.id, draft.date, None).await?;
    let outcome = validate_and_price(&draft, volume, &project.commission_levels)?;

    let record = draft.into_record(Uuid::new_v4().to_string(), project.id, outcome, Utc::now());
    ctx.db.sales().insert(&record).await?;

    info!(id = %record.id, date = %record.date, no_sale = record.is_no_sale(), "Entry recorded");
    Ok(record)
}

async fn add(ctx: &AppContext, args: AddSaleArgs) -> CliResult<String> {
    let draft = SaleDraft {
        date: args.date.unwrap_or_else(|| ctx.today()),
        tours: args.tours,
        lead_number: args.lead,
        notes: args.notes,
        is_cancelled: args.cancelled,
        outcome: DraftOutcome::Sale {
            client_last_name: args.client,
            manager: args.manager,
            sale_type: args.sale_type,
            sale_amount: args.amount,
            fdi_given_points: args.fdi_given,
            trust_points: TrustPoints {
                existing: args.existing_trust,
                new: args.new_trust,
            },
        },
    };

    let record = record(ctx, draft).await?;
    Ok(format!("Recorded sale {}", describe(&record)))
}

async fn no_sale(ctx: &AppContext, args: NoSaleArgs) -> CliResult<String> {
    let draft = SaleDraft {
        date: args.date.unwrap_or_else(|| ctx.today()),
        tours: args.tours,
        lead_number: args.lead,
        notes: args.notes,
        is_cancelled: false,
        outcome: DraftOutcome::NoSale,
    };

    let record = record(ctx, draft).await?;
    Ok(format!("Recorded {}", describe(&record)))
}

async fn edit(ctx: &AppContext, mut args: EditSaleArgs) -> CliResult<String> {
    let mut record = ctx
        .db
        .sales()
        .get_by_id(&args.id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(args.id.clone()))?;
    let project = ctx
        .db
        .projects()
        .get_by_id(&record.project_id)
        .await?
        .ok_or_else(|| CoreError::ProjectNotFound(record.project_id.clone()))?;

    let mut draft = SaleDraft::from_record(&record);
    if let Some(date) = args.date {
        draft.date = date;
    }
    if let Some(tours) = args.tours {
        draft.tours = tours;
    }
    if let Some(lead) = args.lead.take() {
        draft.lead_number = lead;
    }
    if let Some(notes) = args.notes.take() {
        draft.notes = notes;
    }
    draft.outcome = edited_outcome(draft.outcome, &args)?;

    let volume = ctx
        .pricing_volume(&project.id, draft.date, Some(&record.id))
        .await?;
    let outcome = validate_and_price(&draft, volume, &project.commission_levels)?;
    draft.apply_to(&mut record, outcome, Utc::now());
    ctx.db.sales().update(&record).await?;

    info!(id = %record.id, "Entry updated");
    Ok(format!("Updated {}", describe(&record)))
}

/// Applies the outcome fields of an edit.
///
/// Turning a no-sale into a sale needs at least a client and an amount.
fn edited_outcome(current: DraftOutcome, args: &EditSaleArgs) -> CliResult<DraftOutcome> {
    if args.no_sale {
        return Ok(DraftOutcome::NoSale);
    }

    match current {
        DraftOutcome::Sale {
            client_last_name,
            manager,
            sale_type,
            sale_amount,
            fdi_given_points,
            trust_points,
        } => Ok(DraftOutcome::Sale {
            client_last_name: args.client.clone().unwrap_or(client_last_name),
            manager: args.manager.unwrap_or(manager),
            sale_type: args.sale_type.unwrap_or(sale_type),
            sale_amount: args.amount.unwrap_or(sale_amount),
            fdi_given_points: args.fdi_given.unwrap_or(fdi_given_points),
            trust_points: TrustPoints {
                existing: args.existing_trust.unwrap_or(trust_points.existing),
                new: args.new_trust.unwrap_or(trust_points.new),
            },
        }),
        DraftOutcome::NoSale => {
            let touches_sale = args.client.is_some()
                || args.amount.is_some()
                || args.sale_type.is_some()
                || args.manager.is_some()
                || args.fdi_given.is_some();
            if !touches_sale {
                return Ok(DraftOutcome::NoSale);
            }

            match (&args.client, args.amount) {
                (Some(client), Some(amount)) => Ok(DraftOutcome::Sale {
                    client_last_name: client.clone(),
                    manager: args.manager.unwrap_or(ManagerName::Unassigned),
                    sale_type: args.sale_type.unwrap_or(SaleType::Deed),
                    sale_amount: amount,
                    fdi_given_points: args.fdi_given.unwrap_or_default(),
                    trust_points: TrustPoints {
                        existing: args.existing_trust.unwrap_or_default(),
                        new: args.new_trust.unwrap_or_default(),
                    },
                }),
                _ => Err(CliError::validation(
                    "--client and --amount are required to turn a no-sale into a sale",
                )),
            }
        }
    }
}

async fn list(ctx: &AppContext, period: &PeriodArgs) -> CliResult<String> {
    let project = ctx.project().await?;
    let period = ctx.select_period(period).await?;
    let summary = ctx.summary(&project, &period).await?;

    Ok(format!(
        "{} - {} ({} entries)\n{}",
        project.name,
        period.title,
        summary.sales.len(),
        output::sales_table(&summary.sales)
    ))
}

async fn cancel(ctx: &AppContext, id: &str) -> CliResult<String> {
    let cancelled = ctx.db.sales().toggle_cancelled(id).await?;
    Ok(if cancelled {
        format!("Sale {} cancelled", id)
    } else {
        format!("Sale {} reinstated", id)
    })
}

async fn note(ctx: &AppContext, id: &str, text: &str) -> CliResult<String> {
    validate_notes(text)?;
    ctx.db.sales().update_notes(id, text).await?;
    Ok(format!("Notes updated for {}", id))
}

async fn delete(ctx: &AppContext, id: &str) -> CliResult<String> {
    ctx.db.sales().delete(id).await?;
    info!(id = %id, "Entry deleted");
    Ok(format!("Deleted {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::{context, date};
    use crate::error::ErrorCode;
    use tally_core::aggregate::totals_of;
    use tally_core::{Money, Points, Rate};

    fn add_args(client: &str, dollars: i64, sale_type: SaleType, tours: u32) -> AddSaleArgs {
        AddSaleArgs {
            client: client.to_string(),
            amount: Money::from_dollars(dollars),
            sale_type,
            manager: ManagerName::Lisa,
            date: None,
            tours,
            lead: String::new(),
            fdi_given: Points::zero(),
            existing_trust: Points::zero(),
            new_trust: Points::zero(),
            notes: String::new(),
            cancelled: false,
        }
    }

    fn edit_args(id: &str) -> EditSaleArgs {
        EditSaleArgs {
            id: id.to_string(),
            ..EditSaleArgs::default()
        }
    }

    async fn stored(ctx: &AppContext) -> Vec<SaleRecord> {
        let project = ctx.project().await.unwrap();
        ctx.db.sales().list_by_project(&project.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_prices_entry() {
        let ctx = context().await;
        let mut args = add_args("Smith", 10_000, SaleType::Deed, 4);
        args.fdi_given = Points::from_whole(6_000);
        add(&ctx, args).await.unwrap();

        let sales = stored(&ctx).await;
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].date, date(2025, 3, 15));

        let d = sales[0].details().unwrap();
        assert_eq!(d.commission_rate, Rate::from_percent(4));
        assert_eq!(d.commission_amount, Money::from_dollars(400));
        assert_eq!(d.daily_vpg, Money::from_dollars(2_500));
        assert_eq!(d.fdi_points, Points::from_whole(5_500));
        assert_eq!(d.fdi_cost, Money::from_dollars(24));
    }

    #[tokio::test]
    async fn test_tier_rate_comes_from_period_volume() {
        let ctx = context().await;
        add(&ctx, add_args("Big", 170_000, SaleType::Deed, 1)).await.unwrap();
        add(&ctx, add_args("Next", 30_000, SaleType::Deed, 1)).await.unwrap();

        let sales = stored(&ctx).await;
        let next = sales.iter().find(|s| s.client_name() == "Next").unwrap();
        let d = next.details().unwrap();
        assert_eq!(d.commission_rate, Rate::from_percent(6));
        assert_eq!(d.commission_amount, Money::from_dollars(1_500));
    }

    #[tokio::test]
    async fn test_invalid_entry_is_rejected() {
        let ctx = context().await;
        let err = add(&ctx, add_args("  ", 10_000, SaleType::Deed, 1)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        let err = add(&ctx, add_args("Smith", 10_000, SaleType::Deed, 100)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        assert!(stored(&ctx).await.is_empty());
    }

    #[tokio::test]
    async fn test_period_totals_end_to_end() {
        let ctx = context().await;
        add(&ctx, add_args("Smith", 30_000, SaleType::Deed, 2)).await.unwrap();
        let mut trust = add_args("Jones", 60_000, SaleType::Trust, 1);
        trust.cancelled = true;
        add(&ctx, trust).await.unwrap();
        no_sale(
            &ctx,
            NoSaleArgs {
                date: None,
                tours: 0,
                lead: String::new(),
                notes: String::new(),
            },
        )
        .await
        .unwrap();

        let sales = stored(&ctx).await;
        let totals = totals_of(&sales.iter().collect::<Vec<_>>());
        assert_eq!(totals.total_tours, 3);
        assert_eq!(totals.total_volume, Money::from_dollars(30_000));
        assert_eq!(totals.active_sales, 1);
        assert_eq!(totals.cancelled_sales, 1);
        assert_eq!(totals.no_sales, 1);
        assert_eq!(totals.deed_sales, 1);
        assert_eq!(totals.trust_sales, 0);
        assert_eq!(totals.monthly_vpg, Money::from_dollars(10_000));

        let text = list(&ctx, &PeriodArgs::default()).await.unwrap();
        assert!(text.contains("March 2025 (3 entries)"));
        assert!(text.contains("NO SALE"));
    }

    #[tokio::test]
    async fn test_edit_excludes_itself_from_pricing_volume() {
        let ctx = context().await;
        add(&ctx, add_args("Big", 170_000, SaleType::Deed, 1)).await.unwrap();
        let id = stored(&ctx).await[0].id.clone();

        let mut args = edit_args(&id);
        args.amount = Some(Money::from_dollars(180_000));
        args.tours = Some(2);
        edit(&ctx, args).await.unwrap();

        let record = ctx.db.sales().get_by_id(&id).await.unwrap().unwrap();
        let d = record.details().unwrap();
        assert_eq!(d.sale_amount, Money::from_dollars(180_000));
        assert_eq!(d.commission_rate, Rate::from_percent(6));
        assert_eq!(d.daily_vpg, Money::from_dollars(90_000));
        assert_eq!(record.client_name(), "Big");
    }

    #[tokio::test]
    async fn test_edit_lead_and_notes_with_amount() {
        let ctx = context().await;
        add(&ctx, add_args("Smith", 30_000, SaleType::Deed, 1)).await.unwrap();
        let id = stored(&ctx).await[0].id.clone();

        let mut args = edit_args(&id);
        args.lead = Some("L-204".into());
        args.notes = Some("second visit".into());
        args.amount = Some(Money::from_dollars(40_000));
        edit(&ctx, args).await.unwrap();

        let record = ctx.db.sales().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(record.lead_number, "L-204");
        assert_eq!(record.notes, "second visit");
        assert_eq!(record.client_name(), "Smith");
        assert_eq!(record.details().unwrap().sale_amount, Money::from_dollars(40_000));
    }

    #[tokio::test]
    async fn test_edit_switches_outcome() {
        let ctx = context().await;
        add(&ctx, add_args("Smith", 30_000, SaleType::Deed, 1)).await.unwrap();
        let id = stored(&ctx).await[0].id.clone();

        let mut args = edit_args(&id);
        args.no_sale = true;
        edit(&ctx, args).await.unwrap();
        assert!(ctx.db.sales().get_by_id(&id).await.unwrap().unwrap().is_no_sale());

        let mut args = edit_args(&id);
        args.client = Some("Brown".into());
        let err = edit(&ctx, args).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        let mut args = edit_args(&id);
        args.client = Some("Brown".into());
        args.amount = Some(Money::from_dollars(15_000));
        edit(&ctx, args).await.unwrap();

        let record = ctx.db.sales().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(record.client_name(), "Brown");
        assert_eq!(record.details().unwrap().commission_rate, Rate::from_percent(4));
    }

    #[tokio::test]
    async fn test_cancel_note_delete() {
        let ctx = context().await;
        add(&ctx, add_args("Smith", 30_000, SaleType::Deed, 1)).await.unwrap();
        let id = stored(&ctx).await[0].id.clone();

        assert!(cancel(&ctx, &id).await.unwrap().ends_with("cancelled"));
        assert!(cancel(&ctx, &id).await.unwrap().ends_with("reinstated"));

        note(&ctx, &id, "call back in May").await.unwrap();
        let record = ctx.db.sales().get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(record.notes, "call back in May");

        delete(&ctx, &id).await.unwrap();
        let err = delete(&ctx, &id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_edit_unknown_sale() {
        let ctx = context().await;
        let err = edit(&ctx, edit_args("missing")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
