use std::thread;
use std::sync::mpsc;
use std::sync::{ Arc, Mutex, PoisonError };

use log::{ debug, info, trace, warn };

use crate::canvas::{ Canvas, PixelSink };
use crate::tracer::RayTracer;

pub enum Message {
    Row(usize),
    Terminate,
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, tracer: Arc<RayTracer>, canvas: Arc<Mutex<Canvas>>,
        receiver: Arc<Mutex<mpsc::Receiver<Message>>>) -> Worker {
        let (width, height) = {
            let c = canvas.lock().unwrap_or_else(PoisonError::into_inner);
            (c.width, c.height)
        };

        let thread = thread::spawn(move || loop {
            // The receiver lock is released as soon as a message arrives.
            let message = match receiver.lock() {
                Ok(rx) => rx.recv(),
                Err(_) => break,
            };

            match message {
                Ok(Message::Row(y)) => {
                    let row = tracer.render_row(y, width, height);
                    canvas.lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .write_row(y, &row);
                    trace!("Worker {} rendered row {}", id, y);
                },

                // A closed channel means the pool is gone.
                Ok(Message::Terminate) | Err(_) => break,
            }
        });

        Worker { id, thread: Some(thread) }
    }
}

/// A fixed set of threads rendering canvas rows sent to them.
pub struct ThreadPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<Message>,
}

impl ThreadPool {
    /// Spawns `size` workers drawing into `canvas`. At least one worker is
    /// always started.
    pub fn new(size: usize, tracer: RayTracer, canvas: Arc<Mutex<Canvas>>) -> ThreadPool {
        let size = size.max(1);
        let (sender, receiver) = mpsc::channel();

        let tracer = Arc::new(tracer);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size)
            .map(|id| Worker::new(
                id,
                Arc::clone(&tracer),
                Arc::clone(&canvas),
                Arc::clone(&receiver)
            ))
            .collect();

        ThreadPool { workers, sender }
    }

    pub fn execute(&self, message: Message) {
        if self.sender.send(message).is_err() {
            warn!("Render workers exited early; dropping message");
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        for _ in &self.workers {
            self.execute(Message::Terminate);
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    warn!("Render worker {} panicked", worker.id);
                }
            }
        }
    }
}

/// Renders a `width` by `height` image using `threads` workers, one row at a
/// time.
///
/// Produces the same pixels as `RayTracer::ray_trace` on a canvas of the same
/// size.
pub fn parallel_render(tracer: RayTracer, width: usize, height: usize, threads: usize) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    canvas.clear_pixels();
    let canvas = Arc::new(Mutex::new(canvas));

    info!("Rendering {}x{} using {} threads", width, height, threads.max(1));
    {
        let thread_pool = ThreadPool::new(threads, tracer, Arc::clone(&canvas));

        for y in 0..height {
            thread_pool.execute(Message::Row(y));
        }
    }
    debug!("All render workers joined");

    match Arc::try_unwrap(canvas) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
        Err(shared) => shared.lock().unwrap_or_else(PoisonError::into_inner).clone(),
    }
}

#[test]
fn parallel_matches_serial() {
    use crate::camera::{ Camera, Projection };
    use crate::color::Color;
    use crate::light::Light;
    use crate::sphere::SphereObject;
    use crate::tuple::Tuple4D;

    let camera = Camera::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        0.2, 0.2, Projection::Perspective, 4.0,
    ).unwrap();
    let spheres = vec![
        SphereObject::new(Tuple4D::point(-0.5, 0.0, 0.0), 1.0,
            Color::gray(0.1), Color::rgb(0.8, 0.2, 0.2), Color::gray(0.5), 20.0).unwrap(),
        SphereObject::new(Tuple4D::point(1.0, 0.5, -1.0), 0.75,
            Color::gray(0.1), Color::rgb(0.2, 0.2, 0.8), Color::gray(0.5), 20.0).unwrap(),
    ];
    let lights = vec![
        Light::ambient(Color::gray(0.2)),
        Light::point(Color::white(), Tuple4D::point(-3.0, 3.0, 4.0)),
    ];
    let tracer = RayTracer::new(camera, spheres, lights, Color::rgb(0.0, 0.0, 0.1)).unwrap();

    let mut serial = Canvas::new(24, 18);
    tracer.ray_trace(&mut serial);

    let parallel = parallel_render(tracer, 24, 18, 3);
    assert_eq!(parallel, serial);
}
