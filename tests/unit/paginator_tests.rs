/*!
 * Tests for worksheet pagination
 */

use dictsheet::paginator::{page_count, paginate, PAGE_SIZE};

use crate::common;

#[test]
fn test_paginate_withEmptyList_shouldReturnNoPages() {
    assert!(paginate(&[], PAGE_SIZE).is_empty());
}

#[test]
fn test_paginate_withFullPage_shouldReturnOnePage() {
    let sentences = common::numbered_sentences(6);
    let pages = paginate(&sentences, PAGE_SIZE);

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].page_number, 1);
    assert_eq!(pages[0].total_pages, 1);
    assert_eq!(pages[0].starting_index, 0);
    assert_eq!(pages[0].len(), 6);
}

#[test]
fn test_paginate_withSevenSentences_shouldSplitSixAndOne() {
    let sentences = common::numbered_sentences(7);
    let pages = paginate(&sentences, PAGE_SIZE);

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].sentences, &sentences[0..6]);
    assert_eq!(pages[1].sentences, &sentences[6..7]);
    assert_eq!(pages[1].starting_index, 6);
    assert_eq!(pages[1].display_number(0), 7);
    assert!(pages.iter().all(|p| p.total_pages == 2));
}

#[test]
fn test_paginate_withThirteenSentences_shouldHaveThreePages() {
    let sentences = common::numbered_sentences(13);
    let pages = paginate(&sentences, PAGE_SIZE);

    let sizes: Vec<usize> = pages.iter().map(|p| p.len()).collect();
    assert_eq!(sizes, vec![6, 6, 1]);
    let starts: Vec<usize> = pages.iter().map(|p| p.starting_index).collect();
    assert_eq!(starts, vec![0, 6, 12]);
}

#[test]
fn test_paginate_forAnyLength_shouldCoverEverySentenceOnceInOrder() {
    for len in 0..=40 {
        let sentences = common::numbered_sentences(len);
        let pages = paginate(&sentences, PAGE_SIZE);

        assert_eq!(pages.len(), len.div_ceil(PAGE_SIZE), "length {}", len);

        let concatenated: Vec<String> = pages.iter().flat_map(|p| p.sentences.iter().cloned()).collect();
        assert_eq!(concatenated, sentences, "length {}", len);

        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.page_number, i + 1);
            assert_eq!(page.starting_index, i * PAGE_SIZE);
            assert!(!page.is_empty());
            assert!(page.len() <= PAGE_SIZE);
            if i + 1 < pages.len() {
                assert_eq!(page.len(), PAGE_SIZE);
            }
        }
    }
}

#[test]
fn test_numbered_shouldContinueAcrossPages() {
    let sentences = common::numbered_sentences(8);
    let pages = paginate(&sentences, PAGE_SIZE);

    let numbers: Vec<usize> = pages
        .iter()
        .flat_map(|p| p.numbered().map(|(n, _)| n).collect::<Vec<_>>())
        .collect();
    assert_eq!(numbers, (1..=8).collect::<Vec<_>>());

    let second: Vec<(usize, &str)> = pages[1].numbered().collect();
    assert_eq!(second, vec![(7, "문장 7."), (8, "문장 8.")]);
}

#[test]
fn test_paginate_withCustomPageSize_shouldRespectIt() {
    let sentences = common::numbered_sentences(5);
    let pages = paginate(&sentences, 2);

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[2].starting_index, 4);
    assert_eq!(page_count(5, 2), 3);
}
