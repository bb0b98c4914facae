use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

enum Message {
    NewJob(Job),
    Terminate,
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// 固定大小的线程池，用于并行解码、编码帧
#[derive(Debug)]
pub struct ThreadPool {
    workers: Vec<Worker>,
    job_sender: mpsc::Sender<Message>,
}

impl ThreadPool {
    /// 创建线程池。
    ///
    /// `size`线程池中线程的数量。
    ///
    /// # Panics
    ///
    /// `new` 函数在 size 为 0 时会 panic
    pub fn new(size: usize) -> ThreadPool {
        assert!(size > 0);

        let (job_sender, job_receiver) = mpsc::channel();
        let job_receiver = Arc::new(Mutex::new(job_receiver));

        let workers = (0..size)
            .map(|id| Worker::new(id, Arc::clone(&job_receiver)))
            .collect();

        ThreadPool {
            workers,
            job_sender,
        }
    }

    /// 在线程池中执行闭包
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // 工作线程只在线程池销毁时退出，发送不会失败
        let _ = self.job_sender.send(Message::NewJob(Box::new(f)));
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

/// 工作线程
#[derive(Debug)]
struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Message>>>) -> Worker {
        let thread = thread::spawn(move || loop {
            // 锁定接收者等待任务，锁在取到消息后立即释放
            let message = match receiver.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => break,
            };

            match message {
                Ok(Message::NewJob(job)) => job(),
                Ok(Message::Terminate) | Err(_) => break,
            }
        });
        Worker {
            id,
            thread: Some(thread),
        }
    }
}

impl Drop for ThreadPool {
    // 在清理数据时结束线程
    fn drop(&mut self) {
        for _ in &self.workers {
            let _ = self.job_sender.send(Message::Terminate);
        }

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    log::warn!("worker {} panicked", worker.id);
                }
            }
        }
    }
}
