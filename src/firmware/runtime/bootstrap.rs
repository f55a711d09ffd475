use esp_hal::timer::timg::TimerGroup;
use esp_println::println;
use humidity_core::{
    firebase::{FirebaseConfig, FirebaseStore},
    http::Scheme,
    Node,
};

use super::super::{
    config::{api_key, auth_url, database_url, node_config, token_url, HEAP_SIZE},
    net::{self, EspRadio, TcpTransport},
    platform::{EmbassyClock, HardwareRng},
};

type FirmwareNode = Node<EspRadio, FirebaseStore<TcpTransport>, EmbassyClock, HardwareRng>;

pub fn run() -> ! {
    esp_println::logger::init_logger(log::LevelFilter::Info);
    esp_alloc::heap_allocator!(size: HEAP_SIZE);

    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let firebase = match FirebaseConfig::from_urls(api_key(), database_url(), auth_url(), token_url())
    {
        Ok(config) => config,
        Err(err) => {
            println!("boot: store endpoint config err={}", err.as_str());
            halt_forever();
        }
    };
    if let Some(endpoint) = firebase.mismatched_scheme(Scheme::Http) {
        println!("boot: {} endpoint must be http:// (no TLS on device)", endpoint);
        halt_forever();
    }

    let runtime = match net::setup(peripherals.WIFI) {
        Ok(runtime) => runtime,
        Err(err) => {
            println!("boot: {}", err);
            halt_forever();
        }
    };

    let node = Node::new(
        runtime.radio,
        FirebaseStore::new(runtime.transport, firebase),
        EmbassyClock,
        HardwareRng::new(),
        node_config(),
    );
    let net_runner = runtime.net_runner;

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(net::net_task(net_runner));
        spawner.must_spawn(node_task(node));
    });
}

#[embassy_executor::task]
async fn node_task(mut node: FirmwareNode) {
    node.run().await
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
