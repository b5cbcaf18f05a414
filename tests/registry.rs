//! Code Registry tests: minting, redemption, single-use guarantees

mod common;

use std::sync::{Arc, Barrier};

use common::*;

// ============ Code Creation ============

#[test]
fn test_create_code_matches_format_and_persists() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);

    for (tag, plan) in [
        ("7D", PlanType::SevenDay),
        ("30D", PlanType::ThirtyDay),
        ("PERM", PlanType::Permanent),
    ] {
        let code = registry.create_code(tag, true, T0).unwrap();
        assert!(is_well_formed(&code.code, PREFIX), "bad code: {}", code.code);
        assert!(code.code.ends_with(&format!("-{}", tag)));
        assert_eq!(code.plan_type, plan);
        assert!(!code.is_used());

        let stored = registry.get_code(&code.code).unwrap().expect("code should exist");
        assert_eq!(stored, code);
    }
}

#[test]
fn test_create_code_requires_admin() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);

    let result = registry.create_code("7D", false, T0);
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[test]
fn test_lowercase_plan_is_normalized() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);

    let code = registry.create_code(" 30d ", true, T0).unwrap();
    assert_eq!(code.plan_type, PlanType::ThirtyDay);
    assert!(code.code.ends_with("-30D"));
}

#[test]
fn test_unknown_plan_mints_one_shot_code() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);

    let code = registry.create_code("XYZ", true, T0).unwrap();
    assert_eq!(code.plan_type, PlanType::OneShot);
    assert!(code.code.ends_with("-ONCE"));
}

#[test]
fn test_codes_are_unique() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        let code = create_test_code(&registry, "7D");
        assert!(seen.insert(code), "Duplicate license code generated");
    }
}

#[test]
fn test_custom_prefix() {
    let registry = CodeRegistry::new(setup_test_pool(), "Acme");

    let code = create_test_code(&registry, "PERM");
    assert!(code.starts_with("Acme-"));
    assert!(is_well_formed(&code, "Acme"));
}

// ============ Redemption ============

#[test]
fn test_redeem_seven_day_code() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);
    let code = create_test_code(&registry, "7D");

    let redemption = registry.redeem(&code, "user1", T0).unwrap();

    assert_eq!(redemption.plan_label, PlanLabel::SevenDays);
    assert_eq!(redemption.license.user_id, "user1");
    assert_eq!(redemption.license.code, code);
    assert_eq!(redemption.license.activated_at, T0);
    assert_eq!(redemption.license.expires_at, Some(T0 + 7 * ONE_DAY));

    let stored = registry.get_code(&code).unwrap().unwrap();
    assert_eq!(stored.used_by.as_deref(), Some("user1"));
    assert_eq!(stored.used_at, Some(T0));
}

#[test]
fn test_redeem_plan_mapping() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);

    let cases = [
        ("30D", PlanLabel::ThirtyDays, Some(T0 + 30 * ONE_DAY)),
        ("PERM", PlanLabel::Permanent, None),
        ("XYZ", PlanLabel::OneTime, Some(T0 + ONE_DAY)),
    ];

    for (i, (tag, label, expires_at)) in cases.into_iter().enumerate() {
        let code = create_test_code(&registry, tag);
        let user = format!("user{}", i);
        let redemption = registry.redeem(&code, &user, T0).unwrap();
        assert_eq!(redemption.plan_label, label, "plan {}", tag);
        assert_eq!(redemption.license.expires_at, expires_at, "plan {}", tag);
    }
}

#[test]
fn test_redeem_unknown_code() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);

    let result = registry.redeem("Wind-Banner-NOPE0-NOPE0-NOPE0-7D", "user1", T0);
    assert!(matches!(result, Err(AppError::CodeNotFound)));
}

#[test]
fn test_redeem_trims_submitted_code() {
    let registry = CodeRegistry::new(setup_test_pool(), PREFIX);
    let code = create_test_code(&registry, "7D");

    let padded = format!("  {}\n", code);
    assert!(registry.redeem(&padded, "user1", T0).is_ok());
}

#[test]
fn test_blank_user_id_leaves_code_unused() {
    let pool = setup_test_pool();
    let registry = CodeRegistry::new(pool.clone(), PREFIX);
    let store = LicenseStore::new(pool);
    let code = create_test_code(&registry, "30D");

    for user_id in ["", "   "] {
        let result = registry.redeem(&code, user_id, T0);
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    assert!(!registry.get_code(&code).unwrap().unwrap().is_used());
    assert!(store.get_license("").unwrap().is_none());
    assert!(registry.redeem(&code, "user1", T0).is_ok());
}

#[test]
fn test_expiry_overflow_is_rejected_without_consuming_code() {
    let pool = setup_test_pool();
    let registry = CodeRegistry::new(pool.clone(), PREFIX);
    let store = LicenseStore::new(pool);
    let code = create_test_code(&registry, "7D");

    let result = registry.redeem(&code, "user1", i64::MAX - 10);
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert!(!registry.get_code(&code).unwrap().unwrap().is_used());
    assert!(store.get_license("user1").unwrap().is_none());

    // Permanent plans have no expiry to compute.
    let perm = create_test_code(&registry, "PERM");
    let redemption = registry.redeem(&perm, "user1", i64::MAX - 10).unwrap();
    assert_eq!(redemption.license.expires_at, None);
}

#[test]
fn test_second_redemption_fails_for_any_user() {
    let pool = setup_test_pool();
    let registry = CodeRegistry::new(pool.clone(), PREFIX);
    let store = LicenseStore::new(pool);
    let code = create_test_code(&registry, "30D");

    registry.redeem(&code, "user1", T0).unwrap();

    let same_user = registry.redeem(&code, "user1", T0 + 10);
    assert!(matches!(same_user, Err(AppError::CodeAlreadyUsed)));

    let other_user = registry.redeem(&code, "user2", T0 + 20);
    assert!(matches!(other_user, Err(AppError::CodeAlreadyUsed)));

    // Original redemption is intact and user2 got nothing.
    let stored = registry.get_code(&code).unwrap().unwrap();
    assert_eq!(stored.used_by.as_deref(), Some("user1"));
    assert_eq!(stored.used_at, Some(T0));

    assert!(store.get_license("user2").unwrap().is_none());
}

#[test]
fn test_new_redemption_replaces_prior_license() {
    let pool = setup_test_pool();
    let registry = CodeRegistry::new(pool.clone(), PREFIX);
    let store = LicenseStore::new(pool);

    let perm = create_test_code(&registry, "PERM");
    registry.redeem(&perm, "user1", T0).unwrap();

    let week = create_test_code(&registry, "7D");
    registry.redeem(&week, "user1", T0 + ONE_DAY).unwrap();

    let license = store.get_license("user1").unwrap().unwrap();
    assert_eq!(license.code, week);
    assert_eq!(license.plan_label, PlanLabel::SevenDays);
    assert_eq!(license.activated_at, T0 + ONE_DAY);
    // No stacking: expiry counts from the new activation only.
    assert_eq!(license.expires_at, Some(T0 + 8 * ONE_DAY));
}

#[test]
fn test_failed_redemption_leaves_existing_license_alone() {
    let pool = setup_test_pool();
    let registry = CodeRegistry::new(pool.clone(), PREFIX);
    let store = LicenseStore::new(pool);

    let code = create_test_code(&registry, "7D");
    registry.redeem(&code, "user1", T0).unwrap();
    let before = store.get_license("user1").unwrap();

    assert!(registry.redeem(&code, "user1", T0 + ONE_DAY).is_err());
    assert!(registry.redeem("missing", "user1", T0 + ONE_DAY).is_err());

    assert_eq!(store.get_license("user1").unwrap(), before);
}

// ============ Storage primitives ============

#[test]
fn test_insert_license_code_refuses_duplicates() {
    let conn = setup_test_db();
    let code = LicenseCode {
        code: "Wind-Banner-AAAAA-BBBBB-CCCCC-7D".into(),
        plan_type: PlanType::SevenDay,
        created_at: T0,
        used_by: None,
        used_at: None,
    };

    assert!(queries::insert_license_code(&conn, &code).unwrap());

    let clash = LicenseCode {
        plan_type: PlanType::Permanent,
        created_at: T0 + 1,
        ..code.clone()
    };
    assert!(!queries::insert_license_code(&conn, &clash).unwrap());

    let stored = queries::get_license_code(&conn, &code.code).unwrap().unwrap();
    assert_eq!(stored, code);
}

#[test]
fn test_legacy_type_tags_fall_back_to_one_shot() {
    let mut conn = setup_test_db();
    conn.execute(
        "INSERT INTO license_codes (code, type, created_at) VALUES ('legacy', '1D', ?1)",
        [T0],
    )
    .unwrap();

    let stored = queries::get_license_code(&conn, "legacy").unwrap().unwrap();
    assert_eq!(stored.plan_type, PlanType::OneShot);

    let redemption = queries::redeem_license_code_atomic(&mut conn, "legacy", "user1", T0).unwrap();
    assert_eq!(redemption.plan_label, PlanLabel::OneTime);
    assert_eq!(redemption.license.expires_at, Some(T0 + ONE_DAY));
}

#[test]
fn test_corrupt_label_is_a_storage_error() {
    let conn = setup_test_db();
    conn.execute(
        "INSERT INTO licenses (user_id, code, type_label, activated_at) VALUES ('user1', 'x', 'forever', ?1)",
        [T0],
    )
    .unwrap();

    let result = queries::get_license_by_user(&conn, "user1");
    assert!(matches!(result, Err(AppError::StorageUnavailable(_))));
}

// ============ Concurrency ============

#[test]
fn test_concurrent_redemption_of_same_code() {
    let num_threads = 8;
    let (pool, path) = setup_file_pool(num_threads as u32);
    let registry = CodeRegistry::new(pool.clone(), PREFIX);
    let code = Arc::new(create_test_code(&registry, "30D"));

    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let registry = registry.clone();
            let code = Arc::clone(&code);

            std::thread::spawn(move || {
                barrier.wait();
                registry.redeem(&code, &format!("user{}", i), T0)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1, "exactly one redemption should succeed");
    for result in results.iter().filter(|r| r.is_err()) {
        assert!(
            matches!(result, Err(AppError::CodeAlreadyUsed)),
            "losers should see CodeAlreadyUsed, got {:?}",
            result
        );
    }

    // Exactly one license row exists and it belongs to the recorded redeemer.
    let winner = &winners[0].license.user_id;
    let stored = registry.get_code(&code).unwrap().unwrap();
    assert_eq!(stored.used_by.as_ref(), Some(winner));

    let conn = pool.get().unwrap();
    let license_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM licenses", [], |row| row.get(0))
        .unwrap();
    assert_eq!(license_rows, 1);

    drop(conn);
    drop(registry);
    drop(pool);
    remove_db_file(&path);
}
