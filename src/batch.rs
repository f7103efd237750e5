use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use image::RgbaImage;

use crate::isolation::IsolationPipeline;
use crate::models::{InstanceId, InstanceMask, IsolationResult};

/// One image queued for batch isolation.
pub struct BatchJob {
    pub image: RgbaImage,
    pub mask: InstanceMask,
    pub candidates: Vec<InstanceId>,
}

/// Outcome of one batch job, in job order.
pub enum BatchOutcome {
    /// The pipeline isolated a subject.
    Isolated(IsolationResult),
    /// The pipeline ran but found no subject to isolate.
    NoSubject,
    /// The job failed at a boundary (e.g. mask/image dimension mismatch).
    Failed(anyhow::Error),
}

/// Run many isolation jobs on a bounded worker pool.
///
/// The boundary trace is CPU-bound and inherently sequential, so batch
/// throughput comes from one invocation per worker thread. Jobs fan out
/// over an mpsc channel, results come back tagged with their job index and
/// are returned in submission order. A failed job is captured in its
/// outcome and never aborts the rest of the batch.
pub fn process_batch(
    pipeline: Arc<IsolationPipeline>,
    jobs: Vec<BatchJob>,
    workers: usize,
) -> Result<Vec<BatchOutcome>> {
    let total = jobs.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    let workers = workers.max(1).min(total);

    let (job_tx, job_rx) = mpsc::channel::<(usize, BatchJob)>();
    let (result_tx, result_rx) = mpsc::channel::<(usize, BatchOutcome)>();
    let job_rx = Arc::new(std::sync::Mutex::new(job_rx));

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let job_rx = Arc::clone(&job_rx);
        let result_tx = result_tx.clone();
        let pipeline = Arc::clone(&pipeline);
        handles.push(thread::spawn(move || {
            loop {
                let next = {
                    let guard = job_rx.lock().expect("job queue lock");
                    guard.recv()
                };
                let Ok((index, job)) = next else {
                    break; // queue closed, no more work
                };

                let outcome = match pipeline.isolate(&job.image, &job.mask, &job.candidates) {
                    Ok(Some(result)) => BatchOutcome::Isolated(result),
                    Ok(None) => BatchOutcome::NoSubject,
                    Err(err) => BatchOutcome::Failed(err),
                };
                if result_tx.send((index, outcome)).is_err() {
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    for (index, job) in jobs.into_iter().enumerate() {
        job_tx
            .send((index, job))
            .map_err(|e| anyhow::anyhow!("Failed to send batch job: {}", e))?;
    }
    drop(job_tx);

    let mut slots: Vec<Option<BatchOutcome>> = (0..total).map(|_| None).collect();
    for (index, outcome) in result_rx {
        slots[index] = Some(outcome);
    }

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("Batch worker panicked"))?;
    }

    let mut outcomes = Vec::with_capacity(total);
    for slot in slots {
        outcomes.push(slot.ok_or_else(|| anyhow::anyhow!("Batch job produced no outcome"))?);
    }
    Ok(outcomes)
}

/// Default worker count: one per available core.
pub fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn job_with_block(size: u32, x0: u32, y0: u32, side: u32) -> BatchJob {
        let image = RgbaImage::from_pixel(size, size, Rgba([50, 60, 70, 255]));
        let mut mask = InstanceMask::empty(size, size);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.set(x, y, 1);
            }
        }
        BatchJob { image, mask, candidates: vec![1] }
    }

    #[test]
    fn outcomes_come_back_in_job_order() -> Result<()> {
        let pipeline = Arc::new(IsolationPipeline::new());
        let jobs = (0..6)
            .map(|i| job_with_block(60, 5 + i, 5, 10 + i))
            .collect();

        let outcomes = process_batch(pipeline, jobs, 3)?;
        assert_eq!(outcomes.len(), 6);
        for (i, outcome) in outcomes.iter().enumerate() {
            let BatchOutcome::Isolated(result) = outcome else {
                panic!("job {i} should isolate");
            };
            assert_eq!(result.bbox.x, 5 + i as u32);
            assert_eq!(result.bbox.width, 10 + i as u32);
        }
        Ok(())
    }

    #[test]
    fn failed_job_does_not_abort_batch() -> Result<()> {
        let pipeline = Arc::new(IsolationPipeline::new());
        let mismatched = BatchJob {
            image: RgbaImage::new(10, 10),
            mask: InstanceMask::empty(4, 4),
            candidates: vec![1],
        };
        let jobs = vec![job_with_block(60, 10, 10, 20), mismatched, job_with_block(60, 20, 20, 15)];

        let outcomes = process_batch(pipeline, jobs, 2)?;
        assert!(matches!(outcomes[0], BatchOutcome::Isolated(_)));
        assert!(matches!(outcomes[1], BatchOutcome::Failed(_)));
        assert!(matches!(outcomes[2], BatchOutcome::Isolated(_)));
        Ok(())
    }

    #[test]
    fn empty_batch_is_fine() -> Result<()> {
        let pipeline = Arc::new(IsolationPipeline::new());
        assert!(process_batch(pipeline, Vec::new(), 4)?.is_empty());
        Ok(())
    }
}
