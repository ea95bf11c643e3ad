use ndarray::Array3;
use rolemap_core::types::AnalysisRecord;
use rolemap_core::{
    AudioFeatures, Candidate, CandidateSelector, ImageFrame, SceneAnalyzer, SelectionResult,
    SlotAllocation,
};

fn busy_frame(size: usize) -> ImageFrame {
    let mut pixels = Array3::zeros((size, size, 3));
    for y in 0..size {
        for x in 0..size {
            pixels[(y, x, 0)] = ((x * 31 + y * 17) % 251) as f32 / 250.0;
            pixels[(y, x, 1)] = ((x * 7 + y * 29) % 241) as f32 / 240.0;
            pixels[(y, x, 2)] = ((x * 13 + y * 3) % 197) as f32 / 196.0;
        }
    }
    ImageFrame::from_array(pixels).unwrap()
}

fn pool() -> Vec<Candidate> {
    (0..16)
        .map(|i| Candidate {
            id: format!("gen-{i:02}"),
            score: (i % 9) as f32 / 10.0 + 0.1,
            features: AudioFeatures {
                crest: (i % 5) as f32 / 4.0,
                onset_density: (i % 7) as f32 / 6.0,
                noisiness: (i % 3) as f32 / 3.0,
                harmonicity: (i % 4) as f32 / 3.0,
                brightness: 0.5,
            },
            tags: vec![format!("tag-{}", i % 4)],
            family: format!("fam-{}", i % 3),
        })
        .collect()
}

#[test]
fn analysis_is_byte_for_byte_deterministic() {
    let analyzer = SceneAnalyzer::default();
    let frame = busy_frame(256);

    let record1 = analyzer.analyze(&frame).unwrap();
    let record2 = analyzer.analyze(&frame).unwrap();

    let json1 = serde_json::to_string_pretty(&record1).unwrap();
    let json2 = serde_json::to_string_pretty(&record2).unwrap();
    assert_eq!(json1, json2, "analysis output is not deterministic");

    // Separate analyzer instances must agree too.
    let record3 = SceneAnalyzer::default().analyze(&frame).unwrap();
    assert_eq!(json1, serde_json::to_string_pretty(&record3).unwrap());
}

#[test]
fn selection_is_byte_for_byte_deterministic() {
    let selector = CandidateSelector::default();
    let allocation = SlotAllocation {
        accent: 1,
        foreground: 2,
        motion: 2,
        bed: 3,
    };

    let result1 = selector.select(&pool(), &allocation);
    let result2 = selector.select(&pool(), &allocation);

    let json1 = serde_json::to_string_pretty(&result1).unwrap();
    let json2 = serde_json::to_string_pretty(&result2).unwrap();
    assert_eq!(json1, json2, "selection output is not deterministic");
}

#[test]
fn end_to_end_allocation_feeds_selection() {
    let analyzer = SceneAnalyzer::default();
    let record = analyzer.analyze(&busy_frame(256)).unwrap();
    assert_eq!(record.allocation.total(), 8);

    let selector = CandidateSelector::default();
    let result = selector.select(&pool(), &record.allocation);
    assert_eq!(result.selected.len(), 8);

    // Running the whole pipeline again reproduces the same ids in the same
    // order.
    let record2 = analyzer.analyze(&busy_frame(256)).unwrap();
    let result2 = selector.select(&pool(), &record2.allocation);
    assert_eq!(result.debug.selected_ids, result2.debug.selected_ids);
}

#[test]
fn records_roundtrip_through_serde() {
    let analyzer = SceneAnalyzer::default();
    let record = analyzer.analyze(&busy_frame(128)).unwrap();

    let json = serde_json::to_string(&record).unwrap();
    let back: AnalysisRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(record, back);

    // Roles serialize as lowercase names.
    assert!(json.contains("\"accent\""));
    assert!(json.contains("\"bed\""));

    let selector = CandidateSelector::default();
    let result = selector.select(&pool(), &record.allocation);
    let json = serde_json::to_string(&result).unwrap();
    let back: SelectionResult = serde_json::from_str(&json).unwrap();
    assert_eq!(result, back);
}

#[test]
fn serialized_result_structure_is_stable() {
    let selector = CandidateSelector::default();
    let allocation = SlotAllocation {
        accent: 1,
        foreground: 2,
        motion: 2,
        bed: 3,
    };
    let json = serde_json::to_string_pretty(&selector.select(&pool(), &allocation)).unwrap();

    // Selected picks come before the audit record, which ends in the final
    // id list.
    let selected_pos = json.find("\"selected\":").expect("missing selected key");
    let debug_pos = json.find("\"debug\":").expect("missing debug key");
    let ids_pos = json.find("\"selected_ids\":").expect("missing selected_ids key");
    assert!(selected_pos < debug_pos);
    assert!(debug_pos < ids_pos);
}
