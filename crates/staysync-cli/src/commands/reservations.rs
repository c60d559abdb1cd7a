//! `staysync admit`, `reservations`, `cancel`, `bookings` and `cache clear`.

use staysync_core::{DateRange, PaymentInfo, ReservationStatus};
use staysync_engine::{AdmissionRequest, BookingAdmission};

use super::Context;
use crate::cli::AdmitArgs;
use crate::error::{CliError, CliResult};
use crate::render;

/// Admit a booking, refusing stays that overlap anything unless forced.
pub async fn admit(ctx: &Context, args: &AdmitArgs) -> CliResult<String> {
    let room = ctx.config.resolve_room(args.room.room.as_deref())?;

    let mut request = AdmissionRequest::new(&args.name, &args.phone, args.check_in, args.check_out)
        .with_guests(args.adults, args.kids)
        .with_room(room.clone())
        .with_pet(args.pet)
        .with_total_amount(args.amount);
    if let Some(email) = &args.email {
        request = request.with_email(email);
    }
    if let Some(method) = &args.payment_method {
        request = request.with_payment(PaymentInfo {
            method: method.clone(),
            paid_amount: args.paid.unwrap_or(0),
            reference: args.payment_reference.clone(),
        });
    }

    if !args.force {
        if let Ok(stay) = DateRange::new(args.check_in, args.check_out) {
            let grid = ctx.reconciler().compute_availability(&room, stay).await?;
            if !grid.is_range_free(&stay) {
                return Err(CliError::invalid_argument(format!(
                    "{} is not free from {} until {} (use --force to admit anyway)",
                    room, args.check_in, args.check_out
                )));
            }
        }
    }

    let reservation = BookingAdmission::new(ctx.store.clone()).admit(&request).await?;
    ctx.output(&reservation, |r| {
        format!(
            "Admitted {} ({} -> {}, {})",
            r.reservation_number,
            r.check_in(),
            r.check_out(),
            r.room.as_deref().unwrap_or("-")
        )
    })
}

pub async fn list_reservations(ctx: &Context) -> CliResult<String> {
    let reservations = ctx.store.list_reservations().await?;
    ctx.output(&reservations, |r| render::render_reservations(r))
}

pub async fn cancel(ctx: &Context, id: &str) -> CliResult<String> {
    ctx.store
        .set_reservation_status(id, ReservationStatus::Cancelled)
        .await?;
    tracing::info!(id, "Cancelled reservation");
    Ok(format!("Cancelled {}", id))
}

pub async fn list_bookings(ctx: &Context) -> CliResult<String> {
    let bookings = ctx.store.list_external().await?;
    ctx.output(&bookings, |b| render::render_bookings(b))
}

/// Wipe the channel booking cache. Requires `--yes`.
pub async fn clear_cache(ctx: &Context, confirmed: bool) -> CliResult<String> {
    if !confirmed {
        return Err(CliError::invalid_argument(
            "clearing the cache deletes every channel booking; pass --yes to confirm",
        ));
    }
    let removed = ctx.store.clear_external().await?;
    Ok(format!("Removed {} cached channel bookings", removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use chrono::NaiveDate;
    use staysync_core::{BookingSource, ExternalEvent};
    use staysync_engine::EngineError;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn args(name: &str, check_in: u32, check_out: u32) -> AdmitArgs {
        AdmitArgs {
            name: name.to_string(),
            phone: "555-1234".to_string(),
            email: None,
            check_in: date(check_in),
            check_out: date(check_out),
            adults: 2,
            kids: 0,
            pet: false,
            room: crate::cli::RoomArg { room: None },
            amount: 30_000,
            payment_method: Some("cash".to_string()),
            paid: Some(10_000),
            payment_reference: None,
            force: false,
        }
    }

    #[tokio::test]
    async fn admit_then_list_and_cancel() {
        let ctx = testing::context();
        let text = admit(&ctx, &args("Ada Lovelace", 10, 12)).await.unwrap();
        assert!(text.starts_with("Admitted RSV-"), "{}", text);
        assert!(text.ends_with("(2024-05-10 -> 2024-05-12, garden)"), "{}", text);

        let stored = ctx.store.list_reservations().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].payment.as_ref().unwrap().paid_amount, 10_000);

        let listing = list_reservations(&ctx).await.unwrap();
        assert!(listing.contains("APPROVED"));
        assert!(listing.contains("Ada Lovelace"));

        cancel(&ctx, &stored[0].id).await.unwrap();
        assert!(list_reservations(&ctx).await.unwrap().contains("CANCELLED"));
    }

    #[tokio::test]
    async fn admit_refuses_overlapping_stay_unless_forced() {
        let ctx = testing::context();
        admit(&ctx, &args("First Guest", 10, 12)).await.unwrap();

        let err = admit(&ctx, &args("Second Guest", 11, 13)).await.unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));

        let mut forced = args("Second Guest", 11, 13);
        forced.force = true;
        admit(&ctx, &forced).await.unwrap();

        // Checkout day is free for the next arrival.
        admit(&ctx, &args("Third Guest", 13, 14)).await.unwrap();
        assert_eq!(ctx.store.count_reservations().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn admit_validation_error_is_surfaced() {
        let ctx = testing::context();
        let err = admit(&ctx, &args("  ", 10, 12)).await.unwrap_err();
        assert!(matches!(err, CliError::Engine(EngineError::Validation { .. })));
        assert_eq!(ctx.store.count_reservations().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn cancel_unknown_id_fails() {
        let ctx = testing::context();
        let err = cancel(&ctx, "ghost").await.unwrap_err();
        assert!(matches!(err, CliError::Engine(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn cache_clear_requires_confirmation() {
        let ctx = testing::context();
        let stay = DateRange::new(date(10), date(12)).unwrap();
        ctx.store
            .replace_source(
                BookingSource::Airbnb,
                &[ExternalEvent::new("abc@airbnb", BookingSource::Airbnb, "Reserved", stay)],
            )
            .await
            .unwrap();

        assert!(clear_cache(&ctx, false).await.is_err());
        assert!(list_bookings(&ctx).await.unwrap().contains("abc@airbnb"));

        assert_eq!(
            clear_cache(&ctx, true).await.unwrap(),
            "Removed 1 cached channel bookings"
        );
        assert_eq!(list_bookings(&ctx).await.unwrap(), "No cached channel bookings.");
    }
}
