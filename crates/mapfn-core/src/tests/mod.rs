mod markers;
