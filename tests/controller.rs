mod tests {
    use embassy_time::{Duration, Instant};
    use laserharp_core::{
        AnimationId, Command, Controller, ControllerConfig, DiodeArray, Error, FirmwareVersion,
        FollowAction, IpcPacket, IpcTransport, LaserArray, LaserArrayConfig, MAX_BRIGHTNESS,
        NUM_DIODES, Reply, Result, SharedLaserArray, UpdateScheduler, UsbMidiPacket,
    };

    #[derive(Default)]
    struct MockLink {
        sent: Vec<IpcPacket>,
        fail: bool,
    }

    impl IpcTransport for MockLink {
        fn transmit(&mut self, packet: &IpcPacket) -> Result<()> {
            if self.fail {
                return Err(Error::Transmit);
            }
            self.sent.push(*packet);
            Ok(())
        }
    }

    fn controller() -> Controller {
        Controller::new(ControllerConfig {
            version: FirmwareVersion::new(1, 2, 3),
            ..Default::default()
        })
    }

    fn handle(
        controller: &mut Controller,
        array: &mut LaserArray,
        bytes: [u8; 4],
    ) -> Result<Reply> {
        controller.handle_packet(array, &IpcPacket(bytes))
    }

    #[test]
    fn test_boot_lights_everything_and_plays() {
        let mut array = LaserArray::default();
        let mut controller = controller();
        controller.boot(&mut array);

        assert!(controller.animator().is_playing());
        assert_eq!(controller.animator().current_animation(), AnimationId::Boot);
        assert_eq!(controller.animator().follow_action(), FollowAction::Loop);
        assert_eq!(controller.animator().duration(), 5.0);
        assert!((0..NUM_DIODES).all(|index| array.brightness(index) == Ok(MAX_BRIGHTNESS)));
    }

    #[test]
    fn test_first_packet_stops_boot_animation() {
        let mut array = LaserArray::default();
        let mut controller = controller();
        controller.boot(&mut array);

        assert_eq!(handle(&mut controller, &mut array, [0x80, 2, 127, 0]), Ok(Reply::None));
        assert!(!controller.animator().is_playing());
        assert_eq!(array.brightness(2), Ok(MAX_BRIGHTNESS));
    }

    #[test]
    fn test_set_and_get_brightness() {
        let mut array = LaserArray::default();
        let mut controller = controller();

        handle(&mut controller, &mut array, [0x80, 7, 64, 0]).unwrap();
        assert_eq!(array.brightness(7), Ok(31));

        let reply = handle(&mut controller, &mut array, [0x82, 7, 0, 0]);
        assert_eq!(reply, Ok(Reply::Respond(IpcPacket::new(0x82, 7, 62, 0))));

        // Unknown diodes read as zero
        let reply = handle(&mut controller, &mut array, [0x82, 40, 0, 0]);
        assert_eq!(reply, Ok(Reply::Respond(IpcPacket::new(0x82, 40, 0, 0))));
    }

    #[test]
    fn test_set_all_brightness() {
        let mut array = LaserArray::default();
        let mut controller = controller();

        handle(&mut controller, &mut array, [0x81, 127, 0, 0]).unwrap();
        assert!((0..NUM_DIODES).all(|index| array.brightness(index) == Ok(MAX_BRIGHTNESS)));
        assert!(controller.stored_brightness().iter().all(|b| *b == MAX_BRIGHTNESS));
    }

    #[test]
    fn test_invalid_packets_are_rejected() {
        let mut array = LaserArray::default();
        let mut controller = controller();

        assert_eq!(
            handle(&mut controller, &mut array, [0x80, 24, 10, 0]),
            Err(Error::InvalidDiodeIndex { index: 24 })
        );
        assert_eq!(
            handle(&mut controller, &mut array, [0xA0, 0, 0, 0]),
            Err(Error::UnknownCommand { opcode: 0xA0 })
        );
        assert_eq!(
            handle(&mut controller, &mut array, [0x83, 99, 10, 0]),
            Err(Error::InvalidAnimation { id: 99 })
        );
        assert_eq!(
            handle(&mut controller, &mut array, [0x09, 0x90, 60, 100]),
            Err(Error::UnsupportedCommand { opcode: 0x09 })
        );
        assert!(!controller.animator().is_playing());
    }

    #[test]
    fn test_brightness_is_suppressed_during_animation() {
        let mut array = LaserArray::default();
        let mut controller = controller();

        // Test pattern for 1 s, then restore the requested state
        handle(&mut controller, &mut array, [0x83, 2, 10, 3]).unwrap();
        controller.tick(&mut array, 0.02);
        assert_eq!(array.brightness(4), Ok(MAX_BRIGHTNESS));

        handle(&mut controller, &mut array, [0x80, 0, 127, 0]).unwrap();
        handle(&mut controller, &mut array, [0x80, 4, 0, 0]).unwrap();
        assert_eq!(array.brightness(0), Ok(0));
        assert_eq!(array.brightness(4), Ok(MAX_BRIGHTNESS));
        assert_eq!(controller.stored_brightness()[0], MAX_BRIGHTNESS);

        for _ in 0..60 {
            controller.tick(&mut array, 0.02);
        }
        assert!(!controller.animator().is_playing());
        assert_eq!(array.brightness(0), Ok(MAX_BRIGHTNESS));
        assert_eq!(array.brightness(4), Ok(0));
        assert_eq!(array.brightness(5), Ok(0));
    }

    #[test]
    fn test_stop_command_restores_previous_state() {
        let mut array = LaserArray::default();
        let mut controller = controller();

        handle(&mut controller, &mut array, [0x80, 9, 127, 0]).unwrap();
        handle(&mut controller, &mut array, [0x83, 1, 50, 3]).unwrap();
        controller.tick(&mut array, 0.02);
        assert_eq!(array.brightness(9), Ok(0));

        handle(&mut controller, &mut array, [0x84, 0, 0, 0]).unwrap();
        assert!(!controller.animator().is_playing());
        assert_eq!(array.brightness(0), Ok(0));
        assert_eq!(array.brightness(9), Ok(MAX_BRIGHTNESS));
    }

    #[test]
    fn test_version_and_reboot() {
        let mut array = LaserArray::default();
        let mut controller = controller();
        let mut link = MockLink::default();

        let reply = handle(&mut controller, &mut array, [0xF0, 0, 0, 0]).unwrap();
        assert_eq!(reply, Reply::Respond(IpcPacket::new(0xF0, 1, 2, 3)));
        reply.send(&mut link).unwrap();
        assert_eq!(link.sent, [IpcPacket::new(0xF0, 1, 2, 3)]);

        let reply = handle(&mut controller, &mut array, [0xF1, 0, 0, 0]).unwrap();
        assert_eq!(reply, Reply::Reboot);
        reply.send(&mut link).unwrap();
        assert_eq!(link.sent.len(), 1);
    }

    #[test]
    fn test_forward_usb_midi() {
        let controller = controller();
        let mut link = MockLink::default();

        let packet = UsbMidiPacket::from_bytes([0x19, 0x90, 64, 100]);
        controller.forward_usb_midi(packet, &mut link).unwrap();
        assert_eq!(link.sent, [IpcPacket::new(0x09, 0x90, 64, 100)]);

        link.fail = true;
        assert_eq!(
            controller.forward_usb_midi(packet, &mut link),
            Err(Error::Transmit)
        );
    }

    #[test]
    fn test_shared_array_with_fade_ticks() {
        let shared = SharedLaserArray::new(LaserArrayConfig { fade_tick_rate: 30 });
        let mut handle = shared.handle();

        handle.set_brightness(3, 20).unwrap();
        handle
            .fade_brightness(3, 50, Duration::from_millis(100))
            .unwrap();
        for _ in 0..3 {
            shared.on_fade_tick();
        }
        assert_eq!(handle.brightness(3), Ok(50));
        assert_eq!(shared.lock(|array| array.is_fading(3)), Ok(false));

        let frame = shared.frame();
        assert!(frame.iter().any(|mask| mask & (1 << 3) != 0));
    }

    #[test]
    fn test_scheduler_drives_controller() {
        let shared = SharedLaserArray::new(LaserArrayConfig::default());
        let mut handle = shared.handle();
        let mut controller = controller();
        let mut scheduler = UpdateScheduler::new();
        assert!((scheduler.dt() - 0.02).abs() < 1e-9);

        controller
            .execute(
                &mut handle,
                Command::play(AnimationId::Flip, 1.0, FollowAction::StopOff),
            )
            .unwrap();

        let mut now = Instant::from_millis(0);
        for _ in 0..60 {
            let result = scheduler.tick(&mut controller, &mut handle, now);
            assert_eq!(result.sleep_duration, Duration::from_millis(20));
            now = result.next_deadline;
        }
        assert!(!controller.animator().is_playing());
        assert!((0..NUM_DIODES).all(|index| handle.brightness(index) == Ok(0)));
    }

    #[test]
    fn test_scheduler_skips_backlog() {
        let mut array = LaserArray::default();
        let mut controller = controller();
        let mut scheduler = UpdateScheduler::new();

        scheduler.tick(&mut controller, &mut array, Instant::from_millis(0));
        let result = scheduler.tick(&mut controller, &mut array, Instant::from_millis(1000));
        assert_eq!(result.next_deadline, Instant::from_millis(1020));
        assert_eq!(result.sleep_duration, Duration::from_millis(20));
    }
}
