mod common;

use anyhow::Result;
use cleanfoam::application::NewEntry;
use cleanfoam::domain::{WorkerEntry, amounts_equal};
use cleanfoam::io::{Exporter, ImportOptions, Importer};
use common::{cf, parse_date, seed_day, standard, test_service};

fn assert_same_entry(a: &WorkerEntry, b: &WorkerEntry) {
    assert_eq!(a.id, b.id);
    assert_eq!(a.name, b.name);
    assert_eq!(a.note, b.note);
    assert_eq!(a.entry_type(), b.entry_type());
    assert!(amounts_equal(a.total, b.total));
    for (x, y) in [
        (a.due(), b.due()),
        (a.withdrawn(), b.withdrawn()),
        (a.remaining(), b.remaining()),
    ] {
        match (x, y) {
            (Some(x), Some(y)) => assert!(amounts_equal(x, y)),
            (None, None) => {}
            other => panic!("payout mismatch: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_csv_export_then_import_preserves_entries() -> Result<()> {
    let (source, _temp_a) = test_service().await?;
    let (target, _temp_b) = test_service().await?;
    let date = parse_date("2025-03-14");

    seed_day(&source, "2025-03-14").await?;
    let custom = NewEntry {
        custom_due: Some(12.25),
        note: Some("split shift, \"east\" wing".into()),
        ..standard("2025-03-14", "Dora", 37.3, 4.1)
    };
    source.add_entry(custom).await?;

    let mut buffer = Vec::new();
    let exported = Exporter::new(&source)
        .export_entries_csv(date, &mut buffer)
        .await?;
    assert_eq!(exported, 5);

    let result = Importer::new(&target)
        .import_entries_csv(buffer.as_slice(), date, ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 5);
    assert!(result.errors.is_empty());

    let original = source.list_entries(date).await?;
    let imported = target.list_entries(date).await?;
    assert_eq!(imported.len(), original.len());
    for (a, b) in original.iter().zip(imported.iter()) {
        assert_same_entry(a, b);
    }

    // Custom due survives instead of being recomputed
    let dora = imported.iter().find(|e| e.name == "Dora").unwrap();
    assert_eq!(dora.due(), Some(12.25));

    Ok(())
}

#[tokio::test]
async fn test_reimport_skips_existing_entries() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2025-03-14");
    seed_day(&service, "2025-03-14").await?;

    let mut buffer = Vec::new();
    Exporter::new(&service)
        .export_entries_csv(date, &mut buffer)
        .await?;

    let result = Importer::new(&service)
        .import_entries_csv(buffer.as_slice(), date, ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 0);
    assert_eq!(result.skipped, 4);
    assert_eq!(service.list_entries(date).await?.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_import_legacy_csv_without_ids() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2025-03-14");

    let csv = "\
ID,Worker,Total,Due,Withdrawn,Remaining,Note
,Ana,100,25,10,15,
,Foam sale,60,,,,paid by card
,,80,20,0,20,
";

    let result = Importer::new(&service)
        .import_entries_csv(csv.as_bytes(), date, ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 2);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 4);

    let entries = service.list_entries(date).await?;
    assert_eq!(entries.len(), 2);
    assert!(!entries[0].is_cf());
    assert!(entries[1].is_cf());
    assert_eq!(entries[1].note.as_deref(), Some("paid by card"));

    Ok(())
}

#[tokio::test]
async fn test_import_dry_run_writes_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2025-03-14");

    let csv = "Worker,Total\nAna,100\nBruno,95\n";
    let result = Importer::new(&service)
        .import_entries_csv(csv.as_bytes(), date, ImportOptions { dry_run: true })
        .await?;

    assert_eq!(result.imported, 2);
    assert!(service.list_entries(date).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_dry_run_reports_what_import_would_do() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let date = parse_date("2025-03-14");
    let seeded = seed_day(&service, "2025-03-14").await?;

    // Existing ID, blank name, negative total
    let csv = format!("ID,Worker,Total\n{},Ana,100\n,,80\n,Bo,-5\n", seeded[0].id);
    let importer = Importer::new(&service);

    let checked = importer
        .import_entries_csv(csv.as_bytes(), date, ImportOptions { dry_run: true })
        .await?;
    assert_eq!(checked.imported, 0);
    assert_eq!(checked.skipped, 1);
    assert_eq!(checked.errors.len(), 2);
    assert_eq!(service.list_entries(date).await?.len(), 4);

    let imported = importer
        .import_entries_csv(csv.as_bytes(), date, ImportOptions::default())
        .await?;
    assert_eq!(imported.imported, checked.imported);
    assert_eq!(imported.skipped, checked.skipped);
    let lines = |errors: &[cleanfoam::io::ImportError]| -> Vec<usize> {
        errors.iter().map(|e| e.line).collect()
    };
    assert_eq!(lines(&imported.errors), lines(&checked.errors));
    assert_eq!(lines(&imported.errors), vec![3, 4]);
    assert_eq!(service.list_entries(date).await?.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_json_export_then_import() -> Result<()> {
    let (source, _temp_a) = test_service().await?;
    let (target, _temp_b) = test_service().await?;
    let date = parse_date("2025-03-14");

    seed_day(&source, "2025-03-14").await?;
    source.add_entry(cf("2025-03-14", "Extra sale", 15.0)).await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&source)
        .export_day_json(date, false, &mut buffer)
        .await?;
    assert_eq!(snapshot.report.entries.len(), 5);
    assert_eq!(snapshot.report.summary.total, 237.0);

    let json: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(json["report_date"], "2025-03-14");
    assert_eq!(json["summary"]["for_workers"], 41.0);

    let result = Importer::new(&target)
        .import_day_json(buffer.as_slice(), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 5);

    let original = source.list_entries(date).await?;
    let imported = target.list_entries(date).await?;
    for (a, b) in original.iter().zip(imported.iter()) {
        assert_same_entry(a, b);
    }

    Ok(())
}
