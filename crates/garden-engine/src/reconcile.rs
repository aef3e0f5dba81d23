//! Link reconciliation.
//!
//! Rebuilds a note's outgoing edges from its current content: every wiki
//! reference whose title resolves to a same-owner note becomes an edge,
//! with the parser's context window snapshotted onto it. References to
//! titles that do not exist are dropped without record.

use tracing::warn;

use garden_core::{
    wiki, LinkRepository, Note, NoteRepository, Principal,
};

/// Insert edges for every resolvable reference in `note.content`.
///
/// Best-effort throughout: title lookups that fail unexpectedly and edge
/// inserts that fail are logged and skipped, never surfaced. Duplicate
/// references collapse because edge insertion is idempotent on
/// `(source, target)`.
pub(crate) async fn rebuild_outgoing(
    notes: &dyn NoteRepository,
    links: &dyn LinkRepository,
    owner: Principal,
    note: &Note,
) {
    for wiki_ref in wiki::extract_refs(&note.content) {
        let target = match notes.find_by_title(owner, &wiki_ref.title).await {
            Ok(target) => target,
            Err(e) if e.is_not_found() => continue,
            Err(e) => {
                warn!(
                    subsystem = "engine",
                    component = "reconciler",
                    owner_id = %owner,
                    note_id = %note.id,
                    error = %e,
                    "Title lookup failed during reconciliation"
                );
                continue;
            }
        };

        if let Err(e) = links
            .create(owner, note.id, target.id, Some(&wiki_ref.context))
            .await
        {
            warn!(
                subsystem = "engine",
                component = "reconciler",
                owner_id = %owner,
                note_id = %note.id,
                error = %e,
                "Edge insert failed during reconciliation"
            );
        }
    }
}
