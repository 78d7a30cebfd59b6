use criterion::{black_box, criterion_group, criterion_main, Criterion};
use escript_core::StringInterner;
use escript_diagnostics::{BufferSink, Reporter};
use escript_lexer::{Lexer, Stream};
use escript_parser::{Parser, State};

const SCRIPT: &str = r#"
module bench {
    class Point {
        var x: Number = 0;
        var y: Number = 0;

        function Point(x: Number, y: Number) {
            this.x = x;
            this.y = y;
        }

        function get length(): Number {
            return this.x * this.x + this.y * this.y;
        }
    }

    function sum(items): Number {
        var total = 0;
        for each (item in items) {
            total += item.length;
        }
        return total;
    }

    var points = [new Point(1, 2), new Point(3, 4)];
    if (sum(points) > 10) {
        points = [];
    }
}
"#;

fn parse_source(src: &str) -> usize {
    let lexer = Lexer::new(Stream::memory("bench.es", src));
    let reporter = Reporter::new("ec", 4, Box::new(BufferSink::default()));
    let mut parser = Parser::new(lexer, StringInterner::new(), reporter, State::default());
    let program = parser.parse(None);
    let mut nodes = 0;
    program.walk(&mut |_| nodes += 1);
    nodes
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_small_module", |b| {
        b.iter(|| parse_source(black_box(SCRIPT)))
    });

    let large = SCRIPT.repeat(32).replace("module bench", "module big");
    c.bench_function("parse_repeated_module", |b| {
        b.iter(|| parse_source(black_box(&large)))
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
