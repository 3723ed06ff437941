// THEORY:
// The `RegionExtractor` is the spatial grouping stage. It takes the cleaned
// candidate mask and finds every maximal group of set pixels that touch each
// other, including diagonally (8-connectivity).
//
// Algorithm:
// 1.  **Raster seeding**: scan the mask row by row. Every set pixel that has not
//     been visited yet seeds a new component.
// 2.  **Region growing**: from the seed, repeatedly pop a pixel from a work stack
//     and push its unvisited, set neighbors until the component is exhausted.
// 3.  **Aggregation**: while growing, track the bounding corners, the pixel
//     count, and the coordinate sums for the centroid.
// 4.  **Filtering and ordering**: drop components below the minimum area, then
//     order the survivors largest first. The sort is stable, so equal areas keep
//     their raster discovery order and the "primary region" is deterministic.
//
// The extractor is stateless; it has no memory of previous frames.

pub mod region_extractor {
    use crate::core_modules::candidate_mask::CandidateMask;
    use crate::core_modules::region::{BoundingBox, Region};

    /// Returns every 8-connected component with `area >= min_area`, largest first.
    pub fn extract(mask: &CandidateMask, min_area: u32) -> Vec<Region> {
        let width = mask.width() as usize;
        let height = mask.height() as usize;
        let mut visited = vec![false; width * height];
        let mut regions: Vec<Region> = Vec::new();

        for y in 0..height {
            for x in 0..width {
                let index = y * width + x;
                if visited[index] || !mask.get(x as u32, y as u32) {
                    continue;
                }

                let region = grow_region_from_seed(mask, &mut visited, x, y);
                if region.area >= min_area {
                    regions.push(region);
                }
            }
        }

        regions.sort_by(|a, b| b.area.cmp(&a.area));
        regions
    }

    /// Depth-first flood fill over the 8 neighbors of each pixel.
    fn grow_region_from_seed(
        mask: &CandidateMask,
        visited: &mut [bool],
        seed_x: usize,
        seed_y: usize,
    ) -> Region {
        let width = mask.width() as usize;
        let width_i64 = mask.width() as i64;
        let height_i64 = mask.height() as i64;

        let mut stack: Vec<(usize, usize)> = vec![(seed_x, seed_y)];
        visited[seed_y * width + seed_x] = true;

        let mut min_x = seed_x;
        let mut min_y = seed_y;
        let mut max_x = seed_x;
        let mut max_y = seed_y;
        let mut area: u32 = 0;
        let mut sum_x: u64 = 0;
        let mut sum_y: u64 = 0;

        while let Some((x, y)) = stack.pop() {
            area += 1;
            sum_x += x as u64;
            sum_y += y as u64;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || nx >= width_i64 || ny < 0 || ny >= height_i64 {
                        continue;
                    }

                    let (nx, ny) = (nx as usize, ny as usize);
                    let neighbor = ny * width + nx;
                    if !visited[neighbor] && mask.get(nx as u32, ny as u32) {
                        visited[neighbor] = true;
                        stack.push((nx, ny));
                    }
                }
            }
        }

        Region {
            bounding_box: BoundingBox::from_corners(
                min_x as u32,
                min_y as u32,
                max_x as u32,
                max_y as u32,
            ),
            area,
            centroid: (
                sum_x as f64 / area as f64,
                sum_y as f64 / area as f64,
            ),
        }
    }
}
