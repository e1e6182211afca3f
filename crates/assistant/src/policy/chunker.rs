//! Policy document chunking.
//!
//! Splits the SAC markdown document into passages for embedding. Passages
//! follow blank-line boundaries; heading-only paragraphs prefix the passage
//! that follows them, and fragments shorter than `MIN_CHUNK_CHARS` merge
//! into the previous passage so tiny sections don't become their own
//! retrieval unit.

/// Passages shorter than this merge into their neighbor.
const MIN_CHUNK_CHARS: usize = 40;

/// Split a markdown document into passages.
///
/// Deterministic: the same document always produces the same passages in
/// the same order.
#[must_use]
pub fn chunk_document(document: &str) -> Vec<String> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in document.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line.trim_end());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut pending_heading: Option<String> = None;

    for paragraph in paragraphs {
        let heading_only = paragraph
            .lines()
            .all(|line| line.trim_start().starts_with('#'));

        if heading_only {
            pending_heading = Some(match pending_heading.take() {
                Some(heading) => format!("{heading}\n{paragraph}"),
                None => paragraph,
            });
            continue;
        }

        let chunk = match pending_heading.take() {
            Some(heading) => format!("{heading}\n{paragraph}"),
            None => paragraph,
        };

        if chunk.len() < MIN_CHUNK_CHARS
            && let Some(last) = chunks.last_mut()
        {
            last.push_str("\n\n");
            last.push_str(&chunk);
        } else {
            chunks.push(chunk);
        }
    }

    // A trailing heading with no body still carries meaning (section names
    // are searchable); attach it to the last passage.
    if let Some(heading) = pending_heading {
        if let Some(last) = chunks.last_mut() {
            last.push('\n');
            last.push_str(&heading);
        } else {
            chunks.push(heading);
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_no_chunks() {
        assert!(chunk_document("").is_empty());
        assert!(chunk_document("\n\n\n").is_empty());
    }

    #[test]
    fn test_splits_on_blank_lines() {
        let document = "Trocas podem ser feitas em até 30 dias corridos da compra.\n\
                        \n\
                        Devoluções exigem a etiqueta original presa à peça comprada.";
        let chunks = chunk_document(document);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].starts_with("Trocas"));
        assert!(chunks[1].starts_with("Devoluções"));
    }

    #[test]
    fn test_heading_attaches_to_following_paragraph() {
        let document = "## Política de Trocas\n\
                        \n\
                        Trocas podem ser feitas em até 30 dias corridos da compra.";
        let chunks = chunk_document(document);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("## Política de Trocas"));
        assert!(chunks[0].contains("30 dias"));
    }

    #[test]
    fn test_short_fragment_merges_into_previous() {
        let document = "Trocas podem ser feitas em até 30 dias corridos da compra.\n\
                        \n\
                        Sem custo.";
        let chunks = chunk_document(document);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("Sem custo."));
    }

    #[test]
    fn test_multiline_paragraph_stays_together() {
        let document = "Linha um da política de frete para todo o Brasil.\n\
                        Linha dois continua a mesma política de frete.";
        let chunks = chunk_document(document);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("Linha um"));
        assert!(chunks[0].contains("Linha dois"));
    }
}
