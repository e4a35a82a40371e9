//! Geographic search: quadtree descent across every coordinate shard,
//! then title dereference and distance sort.

use geometry::Rect;
use quadindex::Hit;
use titles::Title;
use tracing::{debug, warn};

use crate::{Archive, Result};

impl Archive {
    /// All titles whose coordinates fall inside `rect`, sorted ascending
    /// by distance to the rectangle's center. `limit` caps collection
    /// (`None` = unbounded).
    ///
    /// The rectangle is normalized before use, so negative extents are
    /// accepted. Each hit's title record is dereferenced from the title
    /// index and returned with its geolocation attached.
    ///
    /// # Errors
    ///
    /// Propagates coordinate shard and title index read failures; fails
    /// with `InvalidArchive` when the title index is absent.
    pub fn titles_in_coords(&self, rect: &Rect, limit: Option<usize>) -> Result<Vec<Title>> {
        let query = rect.normalized();

        let mut hits: Vec<Hit> = Vec::new();
        for shard in self.coord_shards.iter().flatten() {
            if limit.is_some_and(|n| hits.len() >= n) {
                break;
            }
            shard.search(&query, limit, &mut hits)?;
        }
        debug!(hits = hits.len(), "coordinate search complete");

        let index = self.title_index()?;
        let center = query.center();
        let mut titles = Vec::with_capacity(hits.len());
        for hit in hits {
            match index.read_record_at(hit.title_offset)? {
                Some(mut title) => {
                    title.geolocation = Some(hit.position);
                    titles.push(title);
                }
                None => {
                    // Coordinate entry pointing past the title index.
                    warn!(title_offset = hit.title_offset, "dangling coordinate entry");
                }
            }
        }

        titles.sort_by(|a, b| {
            let da = a
                .geolocation
                .map_or(f64::INFINITY, |p| p.distance_sq(&center));
            let db = b
                .geolocation
                .map_or(f64::INFINITY, |p| p.distance_sq(&center));
            da.total_cmp(&db)
        });
        if let Some(n) = limit {
            titles.truncate(n);
        }
        Ok(titles)
    }
}
